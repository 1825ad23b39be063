//! Debounced experiment writes.
//!
//! Every `schedule` call supersedes the previous pending write and restarts
//! the delay, so a burst of edits results in a single save.

use super::ExperimentStore;
use crate::models::Experiment;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

enum Command {
    Schedule(Experiment),
    Flush(oneshot::Sender<Result<()>>),
}

/// Background writer that coalesces saves to an [`ExperimentStore`].
pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

impl DebouncedWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn<S>(store: S, delay: Duration) -> Self
    where
        S: ExperimentStore + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(Arc::new(store), delay, rx));
        Self { tx, handle }
    }

    /// Queue a write, replacing any write that has not happened yet.
    pub fn schedule(&self, experiment: Experiment) -> Result<()> {
        self.tx
            .send(Command::Schedule(experiment))
            .map_err(|_| anyhow!("Debounced writer has stopped"))
    }

    /// Write the latest pending experiment now and stop the writer.
    pub async fn flush(self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| anyhow!("Debounced writer has stopped"))?;

        let result = ack_rx
            .await
            .map_err(|_| anyhow!("Debounced writer exited before flushing"))?;
        self.handle.await?;
        result
    }
}

/// Saves on the blocking pool; store writes are synchronous file I/O.
async fn save<S>(store: &Arc<S>, experiment: Experiment) -> Result<()>
where
    S: ExperimentStore + Send + Sync + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || store.save(&experiment)).await?
}

async fn run<S>(
    store: Arc<S>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) where
    S: ExperimentStore + Send + Sync + 'static,
{
    let mut pending: Option<Experiment> = None;

    loop {
        let command = if pending.is_some() {
            tokio::select! {
                command = rx.recv() => command,
                _ = tokio::time::sleep(delay) => {
                    if let Some(experiment) = pending.take() {
                        if let Err(e) = save(&store, experiment).await {
                            error!("Debounced save failed: {:#}", e);
                        }
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Schedule(experiment)) => {
                if pending.replace(experiment).is_some() {
                    debug!("Superseded pending write");
                }
            }
            Some(Command::Flush(ack)) => {
                let result = match pending.take() {
                    Some(experiment) => save(&store, experiment).await,
                    None => Ok(()),
                };
                let _ = ack.send(result);
                return;
            }
            None => {
                // All senders dropped without a flush; keep the last edit anyway
                if let Some(experiment) = pending.take() {
                    if let Err(e) = save(&store, experiment).await {
                        error!("Final save failed: {:#}", e);
                    }
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sample;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingStore {
        saves: Arc<Mutex<Vec<Experiment>>>,
    }

    impl RecordingStore {
        fn saved(&self) -> Vec<Experiment> {
            self.saves.lock().unwrap().clone()
        }
    }

    impl ExperimentStore for RecordingStore {
        fn load(&self) -> Result<Experiment> {
            Ok(self.saved().last().cloned().unwrap_or_default())
        }

        fn save(&self, experiment: &Experiment) -> Result<()> {
            self.saves.lock().unwrap().push(experiment.clone());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            self.saves.lock().unwrap().clear();
            Ok(())
        }
    }

    fn experiment_with(count: usize) -> Experiment {
        let mut experiment = Experiment::default();
        for i in 0..count {
            experiment.add_sample(Sample::new(1.0 + i as f64, -40 - i as i32));
        }
        experiment
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_coalesced() {
        let store = RecordingStore::default();
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(600));

        for n in 1..=5 {
            writer.schedule(experiment_with(n)).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(store.saved().is_empty());

        tokio::time::sleep(Duration::from_millis(700)).await;
        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].samples.len(), 5);

        writer.flush().await.unwrap();
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_pending_immediately() {
        let store = RecordingStore::default();
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_secs(60));

        writer.schedule(experiment_with(2)).unwrap();
        writer.flush().await.unwrap();

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].samples.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_writer_saves_pending() {
        let store = RecordingStore::default();
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_secs(60));

        writer.schedule(experiment_with(1)).unwrap();
        writer.schedule(experiment_with(3)).unwrap();
        drop(writer);

        for _ in 0..10 {
            if !store.saved().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        // Saved on channel close, long before the 60s delay
        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].samples.len(), 3);
    }

    #[tokio::test]
    async fn test_flush_without_pending_is_noop() {
        let store = RecordingStore::default();
        let writer = DebouncedWriter::spawn(store.clone(), Duration::from_millis(10));
        writer.flush().await.unwrap();
        assert!(store.saved().is_empty());
    }
}
