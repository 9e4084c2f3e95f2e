// libs/appointment-cell/src/services/consistency.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Per-doctor scheduling locks.
///
/// The availability check and the write that follows it must happen under
/// the same doctor's lock, otherwise two callers can both see a free slot.
/// Keys are lower-cased so "Sarah Ahmed" and "sarah ahmed" share a lock.
#[derive(Default)]
pub struct SchedulingLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SchedulingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, doctor_name: &str) -> OwnedMutexGuard<()> {
        let key = doctor_name.trim().to_lowercase();
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        debug!("Waiting for scheduling lock on '{}'", key);
        lock.lock_owned().await
    }

    pub fn tracked_doctors(&self) -> usize {
        match self.locks.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_doctor_is_serialized() {
        let locks = Arc::new(SchedulingLocks::new());
        let guard = locks.acquire("Sarah Ahmed").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("  SARAH AHMED ").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert_eq!(locks.tracked_doctors(), 1);
    }

    #[tokio::test]
    async fn test_different_doctors_do_not_block() {
        let locks = SchedulingLocks::new();
        let _first = locks.acquire("Sarah Ahmed").await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire("Rehan Khan")).await;
        assert!(second.is_ok());
        assert_eq!(locks.tracked_doctors(), 2);
    }
}
