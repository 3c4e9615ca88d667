//! Data-key generation and unwrapping.
//!
//! Envelope encryption delegates key protection to an external
//! key-management service: a fresh 64-byte data key is generated per
//! secret, used once, and persisted only in its wrapped form. The
//! plaintext half lives in process memory for a single operation and is
//! zeroized on drop.
//!
//! ## Backends
//!
//! - **AWS KMS**: the production backend ([`AwsKms`]).
//! - **Stub**: deterministic in-process backend for tests and local
//!   development ([`StubKms`]), paired with the memory storage backend.

use zeroize::Zeroizing;

use crate::error::Result;

mod aws;
mod stub;

pub use aws::AwsKms;
pub use stub::StubKms;

/// A one-time data key in both of its forms.
pub struct DataKey {
    /// The raw key bytes; zeroized when the key goes out of scope.
    pub plaintext: Zeroizing<Vec<u8>>,
    /// The key-management service's ciphertext of the same bytes. Safe to
    /// persist next to the payload it protects.
    pub wrapped: Vec<u8>,
}

/// Key-management service capability.
///
/// Injected into [`CredentialStore`](crate::core::secrets::CredentialStore)
/// at construction; there is no process-wide client.
pub trait KeyService {
    /// Generate a fresh data key under `key_id`, returning both the
    /// plaintext and wrapped forms.
    fn generate_data_key(&self, key_id: &str, num_bytes: i32) -> Result<DataKey>;

    /// Unwrap a previously generated data key.
    fn decrypt(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}
