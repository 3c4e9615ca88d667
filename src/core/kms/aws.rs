//! AWS KMS key-service backend.
//!
//! Uses AWS credentials from the environment or the default credential
//! provider chain. The client owns a current-thread tokio runtime so the
//! rest of the crate stays synchronous.

use aws_sdk_kms::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_kms::primitives::Blob;
use tracing::trace;
use zeroize::Zeroizing;

use super::{DataKey, KeyService};
use crate::error::{Error, Result};

/// AWS KMS client.
///
/// KMS records the key identity inside the ciphertext blob, so unwrapping
/// does not need the key id again.
pub struct AwsKms {
    client: aws_sdk_kms::Client,
    rt: tokio::runtime::Runtime,
}

impl AwsKms {
    /// Connect using the default AWS configuration, optionally overriding
    /// the region.
    pub fn connect(region: Option<String>) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Kms(format!("failed to create runtime: {}", e)))?;

        let client = rt.block_on(async {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(aws_config::Region::new(region));
            }
            let config = loader.load().await;
            aws_sdk_kms::Client::new(&config)
        });

        Ok(Self { client, rt })
    }
}

impl KeyService for AwsKms {
    fn generate_data_key(&self, key_id: &str, num_bytes: i32) -> Result<DataKey> {
        trace!(key_id, num_bytes, "generating data key");

        self.rt.block_on(async {
            let out = self
                .client
                .generate_data_key()
                .key_id(key_id)
                .number_of_bytes(num_bytes)
                .send()
                .await
                .map_err(map_kms_err)?;

            let plaintext = out
                .plaintext
                .ok_or_else(|| Error::Kms("no plaintext key returned".into()))?;
            let wrapped = out
                .ciphertext_blob
                .ok_or_else(|| Error::Kms("no wrapped key returned".into()))?;

            Ok(DataKey {
                plaintext: Zeroizing::new(plaintext.into_inner()),
                wrapped: wrapped.into_inner(),
            })
        })
    }

    fn decrypt(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        trace!(wrapped_len = wrapped.len(), "unwrapping data key");

        self.rt.block_on(async {
            let out = self
                .client
                .decrypt()
                .ciphertext_blob(Blob::new(wrapped))
                .send()
                .await
                .map_err(map_kms_err)?;

            let plaintext = out
                .plaintext
                .ok_or_else(|| Error::Kms("no plaintext returned".into()))?;

            Ok(Zeroizing::new(plaintext.into_inner()))
        })
    }
}

/// Map an SDK error, distinguishing authorization failures.
///
/// `AccessDeniedException` is unmodeled in the generated client, so it is
/// detected by error code rather than variant.
fn map_kms_err<E>(err: SdkError<E>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if err.code() == Some("AccessDeniedException") {
        Error::AccessDenied(
            err.message()
                .unwrap_or("access denied by KMS")
                .to_string(),
        )
    } else {
        Error::Kms(DisplayErrorContext(&err).to_string())
    }
}
