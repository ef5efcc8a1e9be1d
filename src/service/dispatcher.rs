//! Concurrent dispatch of transfer tasks over a bounded worker pool.
//!
//! One task per discovered file: read, encode, connect, send, all on the
//! same worker with no handoff. A semaphore caps how many connections are
//! in flight at once; the dispatcher then waits on the full set of tasks
//! as its single synchronization point. Tasks share no mutable state and
//! per-file failures never abort siblings.

use crate::{config::Settings, network::protocol::Frame, network::transport, EqusendError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Progress of a single transfer task. A task moves forward through these
/// in order and stops at the stage where it failed; once terminal it is
/// never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Scheduled,
    Reading,
    Encoding,
    Connecting,
    Sending,
    Done,
}

/// Terminal record of one transfer task.
#[derive(Debug)]
pub struct TransferOutcome {
    pub path: PathBuf,
    pub file_name: String,
    /// `Done` on success, otherwise the stage reached when the task
    /// failed.
    pub stage: TaskStage,
    pub error: Option<EqusendError>,
}

impl TransferOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failed(path: PathBuf, file_name: String, stage: TaskStage, error: EqusendError) -> Self {
        Self {
            path,
            file_name,
            stage,
            error: Some(error),
        }
    }
}

pub struct Dispatcher {
    settings: Arc<Settings>,
}

impl Dispatcher {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Schedule one transfer task per file and wait until every task has
    /// reached a terminal state. Completion order is whatever the pool
    /// produces; no ordering guarantee is made and none is needed, since
    /// each task owns its file, frame and socket exclusively.
    pub async fn dispatch(&self, files: Vec<PathBuf>) -> Vec<TransferOutcome> {
        // A zero-permit semaphore would park every task in acquire_owned
        // and the barrier below would never release; one worker is the
        // floor even if a caller skipped Settings::validate.
        let workers = self.settings.transfer.workers.max(1);
        info!(
            "dispatching {} transfers across {} workers",
            files.len(),
            workers
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for path in files {
            let settings = self.settings.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                // The semaphore is never closed while tasks run.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("worker pool semaphore closed");
                run_transfer(settings, path).await
            });
        }

        // The one barrier in the system: drain the set until every
        // scheduled task is terminal.
        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    if let Some(ref error) = outcome.error {
                        warn!(
                            "transfer of {} failed at {:?}: {}",
                            outcome.file_name, outcome.stage, error
                        );
                    } else {
                        debug!("transfer of {} complete", outcome.file_name);
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    // A panicked task loses its path context; record what
                    // is left so the run still reports a failure.
                    warn!("transfer task panicked: {}", e);
                    outcomes.push(TransferOutcome::failed(
                        PathBuf::new(),
                        String::new(),
                        TaskStage::Scheduled,
                        EqusendError::FileOperation(format!("task panicked: {}", e)),
                    ));
                }
            }
        }
        outcomes
    }
}

/// One complete transfer: read the file, frame it, open a connection and
/// push the bytes. Runs start to finish on a single worker.
async fn run_transfer(settings: Arc<Settings>, path: PathBuf) -> TransferOutcome {
    let file_name = match file_name_of(&path) {
        Ok(name) => name,
        Err(e) => {
            return TransferOutcome::failed(path, String::new(), TaskStage::Reading, e);
        }
    };

    let payload = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return TransferOutcome::failed(
                path,
                file_name,
                TaskStage::Reading,
                EqusendError::FileOperation(format!("failed to read file: {}", e)),
            );
        }
    };

    let frame = match Frame::encode(&file_name, &payload) {
        Ok(frame) => frame,
        Err(e) => {
            return TransferOutcome::failed(path, file_name, TaskStage::Encoding, e);
        }
    };

    let addr = settings.server_addr();
    let timeout = settings.send_timeout();

    let stream = match transport::connect(&addr, timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            return TransferOutcome::failed(path, file_name, TaskStage::Connecting, e);
        }
    };

    if let Err(e) = transport::send(&addr, stream, frame.as_bytes(), timeout).await {
        return TransferOutcome::failed(path, file_name, TaskStage::Sending, e);
    }

    info!(
        "sent {} ({} bytes) to {}",
        file_name,
        frame.len(),
        addr
    );
    TransferOutcome {
        path,
        file_name,
        stage: TaskStage::Done,
        error: None,
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| {
            EqusendError::FileOperation(format!("invalid file name: {}", path.display()))
        })
}
