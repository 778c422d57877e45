//! Background writer
//!
//! Writes are queued to a dedicated thread and attempted once each. Failures
//! are logged and kept as `SaveFailure` reports for the UI to drain. Reads
//! wait for queued writes to land first, so a store never reads stale data.

use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;

use super::{PersistenceError, Storage};

/// A queued write that did not make it to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub key: String,
    pub message: String,
}

#[derive(Debug)]
enum WorkerCommand {
    Write { key: String, blob: String },
    Remove { key: String },
    Flush(mpsc::Sender<()>),
    Shutdown,
}

pub struct PersistenceWorker<S> {
    tx: mpsc::Sender<WorkerCommand>,
    storage: Arc<Mutex<S>>,
    failures: Arc<Mutex<Vec<SaveFailure>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl<S: Storage + Send + 'static> PersistenceWorker<S> {
    /// Move `storage` behind a background writer thread
    pub fn new(storage: S) -> Result<Self, PersistenceError> {
        let storage = Arc::new(Mutex::new(storage));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel::<WorkerCommand>();

        let worker_storage = Arc::clone(&storage);
        let worker_failures = Arc::clone(&failures);
        let handle = thread::Builder::new()
            .name("neo-pong-persistence".into())
            .spawn(move || {
                while let Ok(command) = rx.recv() {
                    let (key, outcome) = match command {
                        WorkerCommand::Write { key, blob } => {
                            let storage =
                                worker_storage.lock().unwrap_or_else(PoisonError::into_inner);
                            let outcome = storage.write(&key, &blob);
                            (key, outcome)
                        }
                        WorkerCommand::Remove { key } => {
                            let storage =
                                worker_storage.lock().unwrap_or_else(PoisonError::into_inner);
                            let outcome = storage.remove(&key);
                            (key, outcome)
                        }
                        WorkerCommand::Flush(ack) => {
                            let _ = ack.send(());
                            continue;
                        }
                        WorkerCommand::Shutdown => break,
                    };

                    if let Err(err) = outcome {
                        log::error!("failed to persist {:?}: {}", key, err);
                        worker_failures
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(SaveFailure {
                                key,
                                message: err.to_string(),
                            });
                    }
                }
            })
            .map_err(|err| {
                PersistenceError::Backend(format!("failed to spawn persistence worker: {}", err))
            })?;

        Ok(Self {
            tx,
            storage,
            failures,
            handle: Some(handle),
        })
    }

    /// Block until every queued write has been attempted
    pub fn flush(&self) -> Result<(), PersistenceError> {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.tx
            .send(WorkerCommand::Flush(ack_tx))
            .map_err(|_| PersistenceError::WorkerGone)?;
        ack_rx.recv().map_err(|_| PersistenceError::WorkerGone)
    }

    /// Drain failure reports collected since the last call
    pub fn take_failures(&self) -> Vec<SaveFailure> {
        std::mem::take(
            &mut *self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn enqueue(&self, command: WorkerCommand) -> Result<(), PersistenceError> {
        self.tx.send(command).map_err(|_| {
            log::error!("persistence worker channel closed; write dropped");
            PersistenceError::WorkerGone
        })
    }
}

impl<S: Storage + Send + 'static> Storage for PersistenceWorker<S> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.flush()?;
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read(key)
    }

    /// Queue the write; backend errors surface later through `take_failures`
    fn write(&self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        self.enqueue(WorkerCommand::Write {
            key: key.to_string(),
            blob: blob.to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.enqueue(WorkerCommand::Remove {
            key: key.to_string(),
        })
    }
}

impl<S> Drop for PersistenceWorker<S> {
    fn drop(&mut self) {
        // Queued writes ahead of the shutdown still run
        let _ = self.tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.join() {
                log::error!("persistence worker thread panicked: {:?}", err);
            }
        }
    }
}
