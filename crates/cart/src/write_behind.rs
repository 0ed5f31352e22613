//! Write-behind queue between the cart engine and its store.
//!
//! Mutations update the in-memory cart first and publish a full snapshot
//! here; one background task drains the queue and talks to the store. The
//! queue is a `watch` channel holding only the latest snapshot, which gives
//! two guarantees at once:
//!
//! - **single-flight**: at most one store write is in progress at a time;
//! - **latest-wins coalescing**: snapshots published while a write is in
//!   flight collapse into one pending write of the newest state, so an
//!   older snapshot can never land after, and clobber, a newer one.
//!
//! Save failures never roll back the in-memory cart. The task logs them at
//! ERROR and records the most recent one; [`WriteBehind::flush`] waits for
//! the queue to drain and hands that failure to the caller once.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use sugarplum_core::LineItem;

use crate::store::{CartStore, StoreError};

/// The full cart state as published to the pump, tagged so progress can be
/// compared against what was enqueued.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    seq: u64,
    items: Vec<LineItem>,
}

/// Handle to the background save task.
///
/// Owned by the cart service; dropping it without [`WriteBehind::close`]
/// stops the task after the last published snapshot is written.
#[derive(Debug)]
pub struct WriteBehind {
    tx: watch::Sender<Snapshot>,
    progress: watch::Receiver<u64>,
    last_failure: Arc<Mutex<Option<StoreError>>>,
    task: JoinHandle<()>,
    next_seq: u64,
}

impl WriteBehind {
    /// Spawn the save task for this store.
    pub fn spawn<S: CartStore>(store: Arc<S>) -> Self {
        let (tx, mut rx) = watch::channel(Snapshot::default());
        let (progress_tx, progress) = watch::channel(0_u64);
        let last_failure = Arc::new(Mutex::new(None));
        let task_failure = Arc::clone(&last_failure);

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                // An emptied cart maps to the backend's clear so flat-file
                // stores drop their document instead of writing [].
                let result = if snapshot.items.is_empty() {
                    store.clear().await
                } else {
                    store.save(&snapshot.items).await
                };
                match result {
                    Ok(()) => {
                        *task_failure.lock().await = None;
                    }
                    Err(e) => {
                        error!(error = %e, seq = snapshot.seq, "Cart save failed");
                        *task_failure.lock().await = Some(e);
                    }
                }
                let _ = progress_tx.send(snapshot.seq);
            }
            info!("Cart save task finished");
        });

        Self {
            tx,
            progress,
            last_failure,
            task,
            next_seq: 0,
        }
    }

    /// Publish the cart state for the next write. Never blocks; returns as
    /// soon as the snapshot is in the pending slot.
    pub fn enqueue(&mut self, items: Vec<LineItem>) {
        self.next_seq += 1;
        let snapshot = Snapshot {
            seq: self.next_seq,
            items,
        };
        if self.tx.send(snapshot).is_err() {
            error!("Cart save task is gone, changes will not be persisted");
        }
    }

    /// Wait until everything enqueued so far has been written (or has
    /// failed), then report the most recent failure if one is pending.
    ///
    /// A failure is reported once; a later successful write clears it.
    ///
    /// # Errors
    ///
    /// Returns the recorded [`StoreError`] of the most recent failed write,
    /// or [`StoreError::Unavailable`] if the save task stopped before
    /// catching up.
    pub async fn flush(&mut self) -> Result<(), StoreError> {
        let target = self.next_seq;
        let caught_up = self
            .progress
            .wait_for(|applied| *applied >= target)
            .await
            .is_ok();

        if let Some(failure) = self.last_failure.lock().await.take() {
            return Err(failure);
        }
        if caught_up {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "cart save task stopped".to_string(),
            ))
        }
    }

    /// Drain the queue, stop the save task, and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Propagates what [`WriteBehind::flush`] reports for the final state.
    pub async fn close(mut self) -> Result<(), StoreError> {
        let result = self.flush().await;
        drop(self.tx);
        if let Err(e) = self.task.await {
            error!(error = %e, "Cart save task did not shut down cleanly");
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingStore {
        saves: Mutex<Vec<Vec<LineItem>>>,
        clears: AtomicUsize,
        fail_saves: AtomicBool,
        save_delay: Option<Duration>,
    }

    impl RecordingStore {
        async fn save_count(&self) -> usize {
            self.saves.lock().await.len()
        }

        async fn last_save(&self) -> Option<Vec<LineItem>> {
            self.saves.lock().await.last().cloned()
        }
    }

    #[async_trait]
    impl CartStore for RecordingStore {
        async fn initialize(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn load(&self) -> Result<Vec<LineItem>, StoreError> {
            Ok(self.last_save().await.unwrap_or_default())
        }

        async fn save(&self, items: &[LineItem]) -> Result<(), StoreError> {
            if let Some(delay) = self.save_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("injected failure".to_string()));
            }
            self.saves.lock().await.push(items.to_vec());
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn item(id: &str) -> LineItem {
        LineItem::new(id, id, "Dessert", Decimal::new(100, 2), "")
    }

    #[tokio::test]
    async fn test_enqueued_snapshot_is_written() {
        let store = Arc::new(RecordingStore::default());
        let mut pump = WriteBehind::spawn(Arc::clone(&store));

        pump.enqueue(vec![item("waffle")]);
        pump.flush().await.unwrap();

        assert_eq!(store.last_save().await.unwrap(), vec![item("waffle")]);
    }

    #[tokio::test]
    async fn test_rapid_mutations_coalesce_to_latest() {
        let store = Arc::new(RecordingStore::default());
        let mut pump = WriteBehind::spawn(Arc::clone(&store));

        // No await between publishes, so on the current-thread test runtime
        // the save task first runs once all five are in the slot.
        for n in 1..=5 {
            let items = (0..n).map(|i| item(&format!("item-{i}"))).collect();
            pump.enqueue(items);
        }
        pump.flush().await.unwrap();

        assert_eq!(store.save_count().await, 1);
        assert_eq!(store.last_save().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_flush_surfaces_failure_once() {
        let store = Arc::new(RecordingStore::default());
        let mut pump = WriteBehind::spawn(Arc::clone(&store));

        store.fail_saves.store(true, Ordering::SeqCst);
        pump.enqueue(vec![item("waffle")]);
        assert!(pump.flush().await.is_err());
        // The failure was handed over; nothing new is pending.
        pump.flush().await.unwrap();

        store.fail_saves.store(false, Ordering::SeqCst);
        pump.enqueue(vec![item("waffle")]);
        pump.flush().await.unwrap();
        assert_eq!(store.save_count().await, 1);
    }

    #[tokio::test]
    async fn test_success_clears_recorded_failure() {
        let store = Arc::new(RecordingStore::default());
        let mut pump = WriteBehind::spawn(Arc::clone(&store));

        store.fail_saves.store(true, Ordering::SeqCst);
        pump.enqueue(vec![item("waffle")]);
        // Let the task attempt and record the failure before the next write.
        pump.progress
            .wait_for(|applied| *applied >= 1)
            .await
            .unwrap();

        store.fail_saves.store(false, Ordering::SeqCst);
        pump.enqueue(vec![item("waffle"), item("tiramisu")]);

        // The later successful write cleared the recorded failure.
        pump.flush().await.unwrap();
        assert_eq!(store.last_save().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_snapshot_clears_backend() {
        let store = Arc::new(RecordingStore::default());
        let mut pump = WriteBehind::spawn(Arc::clone(&store));

        pump.enqueue(vec![item("waffle")]);
        pump.flush().await.unwrap();
        pump.enqueue(Vec::new());
        pump.flush().await.unwrap();

        assert_eq!(store.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_drains_and_joins() {
        let store = Arc::new(RecordingStore {
            save_delay: Some(Duration::from_millis(10)),
            ..RecordingStore::default()
        });
        let mut pump = WriteBehind::spawn(Arc::clone(&store));

        pump.enqueue(vec![item("waffle")]);
        pump.close().await.unwrap();

        assert_eq!(store.save_count().await, 1);
    }
}
