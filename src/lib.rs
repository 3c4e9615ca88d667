//! Stockade - an envelope-encrypted credential store on DynamoDB and KMS.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── commands      # setup/get/put/list/getall/delete handlers
//! │   └── output        # table rendering and terminal messages
//! └── core/             # Core library components
//!     ├── cipher        # AES-256-CTR payload transform
//!     ├── integrity     # HMAC-SHA256 tagging and verification
//!     ├── credential    # Credential / DecryptedCredential types
//!     ├── kms/          # Data-key generation and unwrapping
//!     │   ├── mod       # KeyService trait + data-key type
//!     │   ├── aws       # AWS KMS implementation
//!     │   └── stub      # Deterministic local implementation
//!     ├── store/        # Partitioned key-value storage
//!     │   ├── mod       # Storage trait
//!     │   ├── dynamo    # DynamoDB implementation
//!     │   └── memory    # In-process implementation
//!     ├── secrets       # CredentialStore orchestration
//!     └── setup         # Table provisioning
//! ```
//!
//! # Features
//!
//! - Envelope encryption: every secret gets a fresh 64-byte data key from
//!   KMS, split into a cipher half and an HMAC half; only the wrapped form
//!   of the key is ever persisted
//! - Append-only per-name version history with numeric version ordering
//! - Conflict avoidance through DynamoDB conditional writes
//! - Tamper detection with constant-time HMAC verification
//! - Extensible storage and key-service backends

pub mod cli;
pub mod core;
pub mod error;
