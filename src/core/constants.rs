//! Constants used throughout stockade.
//!
//! Centralizes magic strings and protocol values.

/// KMS key alias used when the caller does not supply one.
pub const DEFAULT_KMS_ALIAS: &str = "alias/stockade";

/// DynamoDB table used when the caller does not supply one.
pub const DEFAULT_TABLE: &str = "credential-store";

/// Number of random bytes requested per data key. The first 32 bytes are
/// the cipher key, the last 32 the HMAC key.
pub const DATA_KEY_BYTES: i32 = 64;

/// Length in bytes of each data-key half.
pub const KEY_HALF_LEN: usize = 32;

/// Rendered in place of the creation date on legacy records that predate
/// the `created_at` attribute.
pub const CREATED_AT_NOT_AVAILABLE: &str = "not available";
