//! Per-path write serialization.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async lock per vault path.
///
/// Holding the guard across a read-modify-write keeps two operations on the
/// same file from interleaving within this process.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`.
    pub async fn lock(&self, path: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(path.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of paths currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_path_is_exclusive() {
        let locks = Arc::new(PathLocks::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let guard = locks.lock("Daily/a.md").await;

        let waiter = {
            let locks = locks.clone();
            let order = order.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("Daily/a.md").await;
                order.lock().push("second");
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        order.lock().push("first");
        drop(guard);
        waiter.await.unwrap();

        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_different_paths_do_not_block() {
        let locks = PathLocks::new();
        let _a = locks.lock("a.md").await;
        let _b = locks.lock("b.md").await;
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = PathLocks::new();
        drop(locks.lock("a.md").await);
        drop(locks.lock("b.md").await);
        assert_eq!(locks.tracked(), 1);
    }
}
