//! Core library components.
//!
//! This module contains the reusable business logic for envelope
//! encryption, version resolution, and storage access.

pub mod cipher;
pub mod constants;
pub mod credential;
pub mod integrity;
pub mod kms;
pub mod secrets;
pub mod setup;
pub mod store;
