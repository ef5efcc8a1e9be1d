//! Run orchestration: discover, dispatch, report.

use crate::service::discovery::discover_files;
use crate::service::dispatcher::{Dispatcher, TransferOutcome};
use crate::{config::Settings, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Aggregate result of one run. The run succeeds only if every discovered
/// file was transmitted; failures are reported per file after all of them
/// have been attempted.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<TransferOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_ok())
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.sent_count()
    }
}

pub struct EqusendClient {
    settings: Arc<Settings>,
}

impl EqusendClient {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Send every equation file in `input_dir` to the configured server.
    ///
    /// An empty input set is fatal before any connection is opened; after
    /// dispatch starts, each file succeeds or fails on its own and all of
    /// them are attempted.
    pub async fn run(&self, input_dir: &Path) -> Result<RunReport> {
        let files = discover_files(input_dir, &self.settings.transfer.extension)?;
        info!(
            "sending {} equation files to {}",
            files.len(),
            self.settings.server_addr()
        );

        let dispatcher = Dispatcher::new(self.settings.clone());
        let outcomes = dispatcher.dispatch(files).await;
        let report = RunReport { outcomes };

        if report.is_success() {
            info!("all {} transfers complete", report.sent_count());
        } else {
            error!(
                "{} of {} transfers failed",
                report.failed_count(),
                report.outcomes.len()
            );
        }
        Ok(report)
    }
}
