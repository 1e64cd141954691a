//! Debounced current-sequence persistence.
//!
//! Field edits arrive in bursts (every keystroke in a field editor can
//! produce one), so the current-sequence snapshot is not written on every
//! change.  Instead the writer keeps the latest pending snapshot and
//! writes it once a quiet period elapses with no newer snapshot arriving.
//! A pending snapshot is also flushed eagerly on [`DebouncedWriter::flush`]
//! and on shutdown, so teardown never loses the last edit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use msc_core::Sequence;

use super::SnapshotStore;

enum Command {
    Write(Box<Sequence>),
    Flush(oneshot::Sender<()>),
}

/// Coalesces current-sequence snapshot writes behind a quiet period.
///
/// Owns a background task; drop without [`DebouncedWriter::shutdown`]
/// still flushes, because closing the channel makes the task write any
/// pending snapshot before exiting.
pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
}

impl DebouncedWriter {
    /// Spawns the writer task for `store` with the given quiet period.
    pub fn spawn(store: Arc<SnapshotStore>, quiet: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_writer(store, rx, quiet));
        Self { tx, worker }
    }

    /// Replaces the pending snapshot and restarts the quiet period.
    pub fn schedule(&self, sequence: Sequence) {
        // Send only fails when the worker is gone, i.e. after shutdown.
        let _ = self.tx.send(Command::Write(Box::new(sequence)));
    }

    /// Writes any pending snapshot now and waits for the write to finish.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flushes and stops the writer task.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}

async fn run_writer(
    store: Arc<SnapshotStore>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    quiet: Duration,
) {
    let mut pending: Option<Box<Sequence>> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        // select! evaluates the timer expression even when disabled, so it
        // needs a harmless stand-in deadline while nothing is pending.
        let wake = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Write(sequence)) => {
                    pending = Some(sequence);
                    deadline = Some(Instant::now() + quiet);
                }
                Some(Command::Flush(ack)) => {
                    write_pending(&store, &mut pending);
                    deadline = None;
                    let _ = ack.send(());
                }
                None => {
                    // Channel closed: final flush, then exit.
                    write_pending(&store, &mut pending);
                    return;
                }
            },
            _ = sleep_until(wake), if deadline.is_some() => {
                write_pending(&store, &mut pending);
                deadline = None;
            }
        }
    }
}

fn write_pending(store: &SnapshotStore, pending: &mut Option<Box<Sequence>>) {
    if let Some(sequence) = pending.take() {
        match store.save_current(&sequence) {
            Ok(()) => debug!(id = %sequence.id, "wrote current-sequence snapshot"),
            Err(e) => warn!(error = %e, "failed to write current-sequence snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sequence(name: &str) -> Sequence {
        Sequence {
            id: "seq-1".to_string(),
            name: name.to_string(),
            protocol: "rrc_demo".to_string(),
            session_id: None,
            messages: Vec::new(),
            sub_sequences: Vec::new(),
            configurations: BTreeMap::new(),
            validation_results: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_flush_writes_latest_pending_snapshot_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(SnapshotStore::open(dir.path()).expect("open"));
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(300));

        // Three edits in a burst; only the last one should land.
        writer.schedule(sequence("one"));
        writer.schedule(sequence("two"));
        writer.schedule(sequence("three"));
        writer.flush().await;

        assert_eq!(store.load_current().expect("snapshot").name, "three");
        writer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_elapsing_writes_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(SnapshotStore::open(dir.path()).expect("open"));
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(300));

        writer.schedule(sequence("edited"));
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(store.load_current().expect("snapshot").name, "edited");
        writer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_edit_restarts_quiet_period() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(SnapshotStore::open(dir.path()).expect("open"));
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(300));

        writer.schedule(sequence("first"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        writer.schedule(sequence("second"));
        tokio::time::sleep(Duration::from_millis(200)).await;

        // 400ms total elapsed but the second edit reset the timer 200ms
        // ago, so nothing has been written yet.
        assert!(store.load_current().is_none());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.load_current().expect("snapshot").name, "second");
        writer.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(SnapshotStore::open(dir.path()).expect("open"));
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(300));

        writer.schedule(sequence("last-edit"));
        writer.shutdown().await;

        assert_eq!(store.load_current().expect("snapshot").name, "last-edit");
    }

    #[test]
    fn test_flush_with_nothing_pending_is_a_no_op() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = Arc::new(SnapshotStore::open(dir.path()).expect("open"));
            let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(300));

            writer.flush().await;
            assert!(store.load_current().is_none());
            writer.shutdown().await;
        });
    }
}
