//! In-process storage backend.
//!
//! Keeps credentials in a `BTreeMap` keyed by `(name, version)`. Gives the
//! same conditional-write and consistency semantics as DynamoDB within a
//! single process, which is all the tests and local development need.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Storage, TableStatus};
use crate::core::credential::Credential;
use crate::error::{Error, Result};

#[derive(Default)]
struct State {
    items: BTreeMap<(String, String), Credential>,
    table_created: bool,
}

/// In-memory credential storage.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))
    }
}

impl Storage for MemoryStorage {
    fn put_if_absent(&self, cred: &Credential) -> Result<()> {
        let mut state = self.lock()?;
        let key = (cred.name.clone(), cred.version.clone());
        if state.items.contains_key(&key) {
            return Err(Error::DuplicateVersion {
                name: cred.name.clone(),
                version: cred.version.clone(),
            });
        }
        state.items.insert(key, cred.clone());
        Ok(())
    }

    fn get(&self, name: &str, version: &str) -> Result<Option<Credential>> {
        let state = self.lock()?;
        Ok(state
            .items
            .get(&(name.to_string(), version.to_string()))
            .cloned())
    }

    fn query_name(&self, name: &str) -> Result<Vec<Credential>> {
        let state = self.lock()?;
        Ok(state
            .items
            .values()
            .filter(|c| c.name == name)
            .cloned()
            .collect())
    }

    fn scan_metadata(&self) -> Result<Vec<Credential>> {
        let state = self.lock()?;
        Ok(state
            .items
            .values()
            .map(|c| Credential {
                name: c.name.clone(),
                version: c.version.clone(),
                key: String::new(),
                contents: String::new(),
                hmac: String::new(),
                created_at: c.created_at,
            })
            .collect())
    }

    fn scan_all(&self) -> Result<Vec<Credential>> {
        let state = self.lock()?;
        Ok(state.items.values().cloned().collect())
    }

    fn delete(&self, name: &str, version: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.items.remove(&(name.to_string(), version.to_string()));
        Ok(())
    }

    fn create_table(&self) -> Result<()> {
        self.lock()?.table_created = true;
        Ok(())
    }

    fn table_status(&self) -> Result<TableStatus> {
        let state = self.lock()?;
        if state.table_created {
            Ok(TableStatus::Active)
        } else {
            Err(Error::Store("table does not exist".into()))
        }
    }
}
