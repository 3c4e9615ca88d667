//! Credential types.
//!
//! A `Credential` is the persisted record: the wrapped data key, the
//! encrypted secret, and the authentication tag, addressed by
//! `(name, version)`. A `DecryptedCredential` additionally carries the
//! plaintext; it exists only for the duration of a successful read and is
//! never persisted.

use crate::core::constants::CREATED_AT_NOT_AVAILABLE;
use crate::error::{Error, Result};

/// A stored credential record.
///
/// `version` holds a base-10 integer as text. Ordering and "latest"
/// selection always go through [`Credential::version_number`]; the raw
/// strings are never compared because lexical order diverges from numeric
/// order once versions reach two digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Secret name (partition key).
    pub name: String,
    /// Decimal version as text (sort key).
    pub version: String,
    /// Data key wrapped by KMS, base64.
    pub key: String,
    /// Encrypted secret, base64.
    pub contents: String,
    /// HMAC-SHA256 tag over the ciphertext, hex.
    pub hmac: String,
    /// Unix timestamp of the write; absent on legacy records.
    pub created_at: Option<i64>,
}

impl Credential {
    /// Parse the version field as an integer.
    pub fn version_number(&self) -> Result<u64> {
        self.version
            .parse::<u64>()
            .map_err(|_| Error::InvalidVersion(self.version.clone()))
    }

    /// Render the creation date, or a placeholder for legacy records.
    pub fn created_at_date(&self) -> String {
        match self
            .created_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => CREATED_AT_NOT_AVAILABLE.to_string(),
        }
    }
}

/// A credential together with its plaintext secret.
///
/// Explicit composition: the record fields stay on `credential`, the
/// transient plaintext on `secret`.
#[derive(Debug, Clone)]
pub struct DecryptedCredential {
    pub credential: Credential,
    pub secret: String,
}
