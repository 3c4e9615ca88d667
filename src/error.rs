use thiserror::Error;

/// All failure modes surfaced by the store.
///
/// The core never retries: every error propagates to the caller intact.
/// The only local recovery is the per-record `AccessDenied` skip during
/// bulk decryption in `CredentialStore::get_all_secrets`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("secret not found")]
    SecretNotFound,

    #[error("secret HMAC validation failed")]
    HmacValidationFailed,

    #[error("version {version} of {name} already exists")]
    DuplicateVersion { name: String, version: String },

    #[error("timed out waiting for table to become active")]
    Timeout,

    #[error("access denied by KMS: {0}")]
    AccessDenied(String),

    #[error("invalid version {0:?}: versions are decimal integers")]
    InvalidVersion(String),

    #[error("KMS error: {0}")]
    Kms(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("decrypted secret is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
