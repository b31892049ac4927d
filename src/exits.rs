//! # Per-pid exit rendezvous between the reaper and the service actors.
//!
//! The reaper is the only caller of the wait primitive, but each service
//! actor needs to know when *its* launched pid has terminated. [`ExitTable`]
//! closes that gap: the reaper calls [`ExitTable::notify`] for every pid it
//! harvests, and an actor awaits [`ExitTable::wait`] on the pid it spawned.
//!
//! # High-level architecture
//!
//! ```text
//!            ┌────────────┐
//!  waitpid ─►│   Reaper   │
//!            └──────┬─────┘
//!               notify(pid)
//!                   ▼
//!            ┌────────────┐
//!            │ ExitTable  │  (oneshot per waiter + unclaimed-pid set)
//!            └──────┬─────┘
//!                wait(pid)
//!                   ▼
//!            ┌────────────┐
//!            │ServiceActor│  (restart / critical decision)
//!            └────────────┘
//! ```
//!
//! A pid reaped before its actor registers lands in the unclaimed set, so
//! the actor still observes the exit; each status is consumed exactly once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

#[derive(Default)]
struct Inner {
    unclaimed: HashSet<i32>,
    waiters: HashMap<i32, oneshot::Sender<()>>,
}

/// Rendezvous table mapping reaped pids to waiting service actors.
#[derive(Clone, Default)]
pub(crate) struct ExitTable {
    inner: Arc<Mutex<Inner>>,
}

impl ExitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `pid` was reaped, waking its waiter if one is registered.
    pub async fn notify(&self, pid: i32) {
        let mut g = self.inner.lock().await;
        match g.waiters.remove(&pid) {
            Some(tx) => {
                let _ = tx.send(());
            }
            None => {
                g.unclaimed.insert(pid);
            }
        }
    }

    /// Resolves when `pid` has been reaped, whether that already happened or
    /// is yet to come.
    pub async fn wait(&self, pid: i32) {
        let rx = {
            let mut g = self.inner.lock().await;
            if g.unclaimed.remove(&pid) {
                return;
            }
            let (tx, rx) = oneshot::channel();
            g.waiters.insert(pid, tx);
            rx
        };
        // The sender is dropped only if the table itself is dropped first;
        // either way the await resolves.
        let _ = rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[tokio::test]
    async fn wait_then_notify() {
        let table = ExitTable::new();
        let waiter = {
            let table = table.clone();
            tokio::spawn(async move { table.wait(42).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        table.notify(42).await;
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn notify_then_wait() {
        let table = ExitTable::new();
        table.notify(7).await;
        table.wait(7).await;
    }

    #[tokio::test]
    async fn pids_do_not_cross() {
        let table = ExitTable::new();
        table.notify(1).await;

        let other = {
            let table = table.clone();
            tokio::spawn(async move { table.wait(2).await })
        };
        table.wait(1).await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!other.is_finished());
        table.notify(2).await;
        other.await.unwrap();
    }
}
