//! Deterministic local key service.
//!
//! "Wraps" keys with a fixed XOR pad — NOT cryptographically secure, just
//! enough structure to exercise the envelope plumbing without network
//! access. Pairs with the memory storage backend for tests and local
//! development.

use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{DataKey, KeyService};
use crate::error::Result;

const STUB_PAD: u8 = 0x5a;

/// In-process stand-in for a key-management service.
///
/// Every generated key is distinct (SHA-256 over an internal counter), so
/// the one-key-per-secret invariant holds even locally.
#[derive(Debug, Default)]
pub struct StubKms {
    counter: AtomicU64,
}

impl StubKms {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyService for StubKms {
    fn generate_data_key(&self, _key_id: &str, num_bytes: i32) -> Result<DataKey> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut plaintext = Vec::with_capacity(num_bytes as usize);
        let mut block = 0u64;
        while plaintext.len() < num_bytes as usize {
            let mut h = Sha256::new();
            h.update(n.to_be_bytes());
            h.update(block.to_be_bytes());
            plaintext.extend_from_slice(&h.finalize());
            block += 1;
        }
        plaintext.truncate(num_bytes as usize);

        let wrapped = plaintext.iter().map(|b| b ^ STUB_PAD).collect();

        Ok(DataKey {
            plaintext: Zeroizing::new(plaintext),
            wrapped,
        })
    }

    fn decrypt(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(wrapped.iter().map(|b| b ^ STUB_PAD).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DATA_KEY_BYTES;

    #[test]
    fn test_generated_keys_are_distinct() {
        let kms = StubKms::new();
        let a = kms.generate_data_key("alias/test", DATA_KEY_BYTES).unwrap();
        let b = kms.generate_data_key("alias/test", DATA_KEY_BYTES).unwrap();
        assert_ne!(*a.plaintext, *b.plaintext);
        assert_eq!(a.plaintext.len(), 64);
    }

    #[test]
    fn test_unwrap_recovers_plaintext() {
        let kms = StubKms::new();
        let key = kms.generate_data_key("alias/test", DATA_KEY_BYTES).unwrap();
        let unwrapped = kms.decrypt(&key.wrapped).unwrap();
        assert_eq!(*unwrapped, *key.plaintext);
    }

    #[test]
    fn test_wrapped_differs_from_plaintext() {
        let kms = StubKms::new();
        let key = kms.generate_data_key("alias/test", DATA_KEY_BYTES).unwrap();
        assert_ne!(key.wrapped, *key.plaintext);
    }
}
