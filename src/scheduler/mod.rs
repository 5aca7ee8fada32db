//! Debounced persistence of the catalog tree.
//!
//! Bursts of schedule() calls within the quiet window collapse into a single
//! write of the latest tree: a pending write is replaced, never queued.
//! Writes run serially inside one task, so an in-flight write and a newly
//! scheduled one can never interleave. A failed write is logged and the
//! in-memory tree stays the user-visible truth.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::models::Department;
use crate::store::DocumentStore;

pub struct PersistScheduler {
    tx: mpsc::UnboundedSender<Vec<Department>>,
    handle: JoinHandle<()>,
}

impl PersistScheduler {
    /// Spawn the writer task against the given store.
    pub fn spawn<S>(store: Arc<S>, quiet: Duration) -> Self
    where
        S: DocumentStore + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Department>>();
        let handle = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                // Absorb newer trees until the window stays quiet.
                loop {
                    match timeout(quiet, rx.recv()).await {
                        Ok(Some(newer)) => latest = newer,
                        Ok(None) | Err(_) => break,
                    }
                }
                if let Err(e) = store.write(&latest).await {
                    tracing::warn!("Remote write failed; keeping local state as truth: {}", e);
                }
            }
        });
        Self { tx, handle }
    }

    /// Replace the pending write with this tree.
    pub fn schedule(&self, tree: Vec<Department>) {
        if self.tx.send(tree).is_err() {
            tracing::warn!("Persistence task is gone; dropping scheduled write");
        }
    }

    /// Flush any pending write and stop the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::warn!("Persistence task ended abnormally: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use crate::errors::CoreError;
    use crate::store::RawDocument;

    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<Vec<Department>>>,
        fail_next: AtomicBool,
    }

    impl RecordingStore {
        fn writes(&self) -> Vec<Vec<Department>> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl DocumentStore for RecordingStore {
        async fn fetch(&self) -> Result<RawDocument, CoreError> {
            Err(CoreError::Unconfigured)
        }

        async fn write(&self, tree: &[Department]) -> Result<(), CoreError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(CoreError::Transport("store offline".to_string()));
            }
            self.writes.lock().unwrap().push(tree.to_vec());
            Ok(())
        }
    }

    fn tree(name: &str) -> Vec<Department> {
        vec![Department {
            id: format!("dept-{}", name),
            name: name.to_string(),
            subjects: Vec::new(),
        }]
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_latest_write() {
        let store = Arc::new(RecordingStore::default());
        let scheduler = PersistScheduler::spawn(store.clone(), Duration::from_millis(1500));

        scheduler.schedule(tree("m1"));
        scheduler.schedule(tree("m2"));
        scheduler.schedule(tree("m3"));

        tokio::time::sleep(Duration::from_millis(2000)).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0], tree("m3"));

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_write_separately() {
        let store = Arc::new(RecordingStore::default());
        let scheduler = PersistScheduler::spawn(store.clone(), Duration::from_millis(1500));

        scheduler.schedule(tree("first"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        scheduler.schedule(tree("second"));
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], tree("first"));
        assert_eq!(writes[1], tree("second"));

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_write() {
        let store = Arc::new(RecordingStore::default());
        let scheduler = PersistScheduler::spawn(store.clone(), Duration::from_secs(60));

        scheduler.schedule(tree("pending"));
        scheduler.shutdown().await;

        assert_eq!(store.writes(), vec![tree("pending")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_does_not_kill_the_task() {
        let store = Arc::new(RecordingStore::default());
        store.fail_next.store(true, Ordering::SeqCst);
        let scheduler = PersistScheduler::spawn(store.clone(), Duration::from_millis(1500));

        scheduler.schedule(tree("lost"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(store.writes().is_empty());

        scheduler.schedule(tree("recovered"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(store.writes(), vec![tree("recovered")]);

        scheduler.shutdown().await;
    }
}
