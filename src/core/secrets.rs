//! Credential store orchestration.
//!
//! Ties the data-key service, the cipher, and the integrity check together
//! over a storage backend. A write generates a fresh data key, encrypts,
//! tags, and writes conditionally; a read fetches, unwraps, verifies, and
//! only then decrypts.
//!
//! Nothing here retries. Two writers racing to auto-resolve the next
//! version can compute the same number; the storage condition rejects the
//! loser, who must re-resolve and try again.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info};

use crate::core::cipher;
use crate::core::constants::{DATA_KEY_BYTES, DEFAULT_KMS_ALIAS, KEY_HALF_LEN};
use crate::core::credential::{Credential, DecryptedCredential};
use crate::core::integrity;
use crate::core::kms::KeyService;
use crate::core::store::Storage;
use crate::error::{Error, Result};

/// The credential store.
///
/// Storage and key-service clients are injected at construction; the store
/// holds no other state and is safe to share between read operations.
pub struct CredentialStore<S, K> {
    storage: S,
    keys: K,
}

impl<S: Storage, K: KeyService> CredentialStore<S, K> {
    pub fn new(storage: S, keys: K) -> Self {
        Self { storage, keys }
    }

    /// Encrypt and store a secret under `(name, version)`.
    ///
    /// An empty `alias` falls back to the default KMS alias, an empty
    /// `version` to `"1"`. Fails with [`Error::DuplicateVersion`] when the
    /// exact `(name, version)` pair already exists; the stored record is
    /// never overwritten.
    pub fn put(&self, name: &str, alias: &str, secret: &str, version: &str) -> Result<()> {
        let key_id = if alias.is_empty() {
            DEFAULT_KMS_ALIAS
        } else {
            alias
        };
        let version = if version.is_empty() { "1" } else { version };
        debug!(name, version, key_id, "storing secret");

        let data_key = self.keys.generate_data_key(key_id, DATA_KEY_BYTES)?;
        let (cipher_key, hmac_key) = split_data_key(&data_key.plaintext)?;

        let ciphertext = cipher::transform(cipher_key, secret.as_bytes());
        let tag = integrity::tag(&ciphertext, hmac_key);

        let cred = Credential {
            name: name.to_string(),
            version: version.to_string(),
            key: BASE64.encode(&data_key.wrapped),
            contents: BASE64.encode(&ciphertext),
            hmac: tag,
            created_at: Some(chrono::Utc::now().timestamp()),
        };

        self.storage.put_if_absent(&cred)
    }

    /// Retrieve and decrypt a secret.
    ///
    /// With a version, fetches that exact record; without one, the
    /// numerically highest version wins. Integrity failures surface as
    /// [`Error::HmacValidationFailed`] and return no plaintext.
    pub fn get(&self, name: &str, version: Option<&str>) -> Result<DecryptedCredential> {
        debug!(name, ?version, "getting secret");

        let cred = match version {
            Some(v) if !v.is_empty() => self.storage.get(name, v)?,
            _ => latest_of(self.storage.query_name(name)?),
        };

        let cred = cred.ok_or(Error::SecretNotFound)?;
        self.decrypt_credential(cred)
    }

    /// List stored secrets without touching the key-management service.
    ///
    /// Returns metadata only (name, version, creation date), collapsed to
    /// the numerically highest version per name unless `all_versions` is
    /// set, ordered by name ascending.
    pub fn list_secrets(&self, all_versions: bool) -> Result<Vec<Credential>> {
        debug!(all_versions, "listing secrets");

        let mut creds = self.storage.scan_metadata()?;
        if !all_versions {
            creds = filter_latest(creds);
        }
        sort_credentials(&mut creds);
        Ok(creds)
    }

    /// Retrieve and decrypt every stored secret.
    ///
    /// A record the key-management service refuses to unwrap
    /// (access denied) is skipped with a diagnostic and listing continues;
    /// any other failure aborts immediately, because a record that fails
    /// integrity or decoding indicates tampering rather than a missing
    /// grant.
    pub fn get_all_secrets(&self, all_versions: bool) -> Result<Vec<DecryptedCredential>> {
        debug!(all_versions, "getting all secrets");

        let mut creds = self.storage.scan_all()?;
        if !all_versions {
            creds = filter_latest(creds);
        }
        sort_credentials(&mut creds);

        let mut results = Vec::with_capacity(creds.len());
        for cred in creds {
            let name = cred.name.clone();
            match self.decrypt_credential(cred) {
                Ok(decrypted) => results.push(decrypted),
                Err(Error::AccessDenied(msg)) => {
                    debug!(%name, %msg, "KMS denied decrypt, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }

    /// Delete every version stored under `name`.
    ///
    /// Deletions happen one item at a time and are not atomic across
    /// versions: a failure partway leaves earlier deletions in place and
    /// reports the first error.
    pub fn delete(&self, name: &str) -> Result<()> {
        let creds = self.storage.query_name(name)?;
        debug!(name, versions = creds.len(), "deleting secret");

        for cred in creds {
            info!(name = %cred.name, version = %cred.version, "deleting");
            self.storage.delete(&cred.name, &cred.version)?;
        }
        Ok(())
    }

    /// Decide the version string for a new write.
    ///
    /// A nonzero explicit version is used verbatim; otherwise the
    /// numerically highest stored version plus one, or `"1"` for a new
    /// name. Advisory only: uniqueness is enforced by the conditional
    /// write, not here.
    pub fn resolve_version(&self, name: &str, version: u64) -> Result<String> {
        if version != 0 {
            return Ok(version.to_string());
        }

        let creds = self.storage.query_name(name)?;
        let highest = creds
            .iter()
            .map(Credential::version_number)
            .collect::<Result<Vec<u64>>>()?
            .into_iter()
            .max();

        Ok(match highest {
            Some(v) => (v + 1).to_string(),
            None => "1".to_string(),
        })
    }

    fn decrypt_credential(&self, cred: Credential) -> Result<DecryptedCredential> {
        let wrapped = BASE64.decode(&cred.key)?;
        let plaintext_key = self.keys.decrypt(&wrapped)?;
        let (cipher_key, hmac_key) = split_data_key(&plaintext_key)?;

        let ciphertext = BASE64.decode(&cred.contents)?;
        integrity::verify(&ciphertext, hmac_key, &cred.hmac)?;

        let secret = String::from_utf8(cipher::transform(cipher_key, &ciphertext))?;
        Ok(DecryptedCredential {
            credential: cred,
            secret,
        })
    }
}

/// Split a 64-byte data key into its cipher and HMAC halves.
fn split_data_key(bytes: &[u8]) -> Result<(&[u8; KEY_HALF_LEN], &[u8; KEY_HALF_LEN])> {
    if bytes.len() != DATA_KEY_BYTES as usize {
        return Err(Error::Kms(format!(
            "unexpected data key length: {}",
            bytes.len()
        )));
    }
    let (cipher_half, hmac_half) = bytes.split_at(KEY_HALF_LEN);
    let cipher_key = cipher_half
        .try_into()
        .map_err(|_| Error::Kms("unexpected data key length".into()))?;
    let hmac_key = hmac_half
        .try_into()
        .map_err(|_| Error::Kms("unexpected data key length".into()))?;
    Ok((cipher_key, hmac_key))
}

/// Numeric rank of a record for latest-selection. An unparsable version
/// attribute ranks lowest, with a diagnostic: it can lose to any parsable
/// version but never silently win over one.
fn version_rank(cred: &Credential) -> u64 {
    cred.version_number().unwrap_or_else(|_| {
        debug!(
            name = %cred.name,
            version = %cred.version,
            "unparsable version attribute, ranking lowest"
        );
        0
    })
}

/// Pick the numerically highest version, if any.
fn latest_of(creds: Vec<Credential>) -> Option<Credential> {
    creds
        .into_iter()
        .map(|c| (version_rank(&c), c))
        .max_by_key(|(rank, _)| *rank)
        .map(|(_, c)| c)
}

/// Collapse to one record per name, keeping the numerically highest
/// version. Lexical order over the version strings would get this wrong as
/// soon as a name reaches ten versions.
fn filter_latest(creds: Vec<Credential>) -> Vec<Credential> {
    let mut latest: std::collections::BTreeMap<String, (u64, Credential)> = Default::default();
    for cred in creds {
        let rank = version_rank(&cred);
        match latest.get(&cred.name) {
            Some((existing, _)) if *existing >= rank => {}
            _ => {
                latest.insert(cred.name.clone(), (rank, cred));
            }
        }
    }
    latest.into_values().map(|(_, c)| c).collect()
}

/// Order by name ascending, then by numeric version.
fn sort_credentials(creds: &mut [Credential]) {
    creds.sort_by(|a, b| {
        a.name.cmp(&b.name).then_with(|| {
            a.version_number()
                .unwrap_or(0)
                .cmp(&b.version_number().unwrap_or(0))
        })
    });
}
