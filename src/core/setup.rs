//! Table provisioning.
//!
//! Issues the create-table request once and polls the table status until
//! it reports active or an overall deadline elapses. Single-shot: the
//! create call itself is never retried.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::core::store::{Storage, TableStatus};
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const CREATE_TIMEOUT: Duration = Duration::from_secs(30);

/// One-shot table provisioner.
pub struct TableProvisioner<'a, S> {
    storage: &'a S,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a, S: Storage> TableProvisioner<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            poll_interval: POLL_INTERVAL,
            timeout: CREATE_TIMEOUT,
        }
    }

    /// Override the polling cadence and deadline.
    pub fn with_timing(storage: &'a S, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            storage,
            poll_interval,
            timeout,
        }
    }

    /// Create the table and wait for it to become active.
    ///
    /// Returns [`Error::Timeout`] if the table has not reported active
    /// within the deadline; status-check errors propagate unchanged.
    pub fn setup(&self) -> Result<()> {
        info!("creating credential table");
        self.storage.create_table()?;
        self.wait_for_active()
    }

    fn wait_for_active(&self) -> Result<()> {
        let deadline = Instant::now() + self.timeout;

        loop {
            match self.storage.table_status()? {
                TableStatus::Active => return Ok(()),
                status => debug!(?status, "table not ready"),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout);
            }
            std::thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credential::Credential;
    use crate::core::store::MemoryStorage;
    use std::sync::Mutex;

    /// Storage whose status walks through a scripted sequence.
    struct ScriptedStorage {
        statuses: Mutex<Vec<TableStatus>>,
    }

    impl ScriptedStorage {
        fn new(mut statuses: Vec<TableStatus>) -> Self {
            statuses.reverse();
            Self {
                statuses: Mutex::new(statuses),
            }
        }
    }

    impl Storage for ScriptedStorage {
        fn put_if_absent(&self, _: &Credential) -> Result<()> {
            unimplemented!()
        }
        fn get(&self, _: &str, _: &str) -> Result<Option<Credential>> {
            unimplemented!()
        }
        fn query_name(&self, _: &str) -> Result<Vec<Credential>> {
            unimplemented!()
        }
        fn scan_metadata(&self) -> Result<Vec<Credential>> {
            unimplemented!()
        }
        fn scan_all(&self) -> Result<Vec<Credential>> {
            unimplemented!()
        }
        fn delete(&self, _: &str, _: &str) -> Result<()> {
            unimplemented!()
        }
        fn create_table(&self) -> Result<()> {
            Ok(())
        }
        fn table_status(&self) -> Result<TableStatus> {
            let mut statuses = self.statuses.lock().unwrap();
            Ok(statuses.pop().unwrap_or(TableStatus::Creating))
        }
    }

    fn fast(storage: &ScriptedStorage, timeout_ms: u64) -> TableProvisioner<'_, ScriptedStorage> {
        TableProvisioner::with_timing(
            storage,
            Duration::from_millis(1),
            Duration::from_millis(timeout_ms),
        )
    }

    #[test]
    fn test_setup_waits_through_creating() {
        let storage = ScriptedStorage::new(vec![
            TableStatus::Creating,
            TableStatus::Creating,
            TableStatus::Active,
        ]);
        fast(&storage, 1_000).setup().unwrap();
    }

    #[test]
    fn test_setup_times_out_when_never_active() {
        let storage = ScriptedStorage::new(vec![]);
        assert!(matches!(fast(&storage, 10).setup(), Err(Error::Timeout)));
    }

    #[test]
    fn test_setup_on_memory_storage() {
        let storage = MemoryStorage::new();
        TableProvisioner::new(&storage).setup().unwrap();
    }
}
