//! Background import jobs.
//!
//! One tokio task per job. The registry holds a cancellation token for
//! every job still running; the task removes its own entry when it ends.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::ImportError;
use super::progress::ImportProgress;
use super::service::{ImportRunner, PayrollRepository};
use super::sheet::SheetFormat;
use super::types::ImportJob;

/// Starts, tracks and cancels import jobs.
pub struct ImportJobs<R: PayrollRepository + 'static> {
    runner: Arc<ImportRunner<R>>,
    running: Arc<DashMap<Uuid, CancellationToken>>,
}

impl<R: PayrollRepository + 'static> Clone for ImportJobs<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            running: Arc::clone(&self.running),
        }
    }
}

impl<R: PayrollRepository + 'static> ImportJobs<R> {
    /// Create a job registry around a runner.
    #[must_use]
    pub fn new(runner: Arc<ImportRunner<R>>) -> Self {
        Self {
            runner,
            running: Arc::new(DashMap::new()),
        }
    }

    /// Stages the upload and launches its worker.
    ///
    /// Returns as soon as the file is staged; the job id is what clients
    /// poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is unsupported or staging fails. No
    /// job exists in that case.
    pub async fn start(
        &self,
        file_name: &str,
        data: Bytes,
        uploader_id: Uuid,
    ) -> Result<Uuid, ImportError> {
        SheetFormat::from_file_name(file_name)?;

        let job_id = Uuid::now_v7();
        let staged_key = self.runner.staging().stage(job_id, file_name, data).await?;
        let job = ImportJob {
            id: job_id,
            staged_key,
            file_name: file_name.to_string(),
            uploader_id,
        };

        self.runner.progress().put(job_id, ImportProgress::queued());
        let token = CancellationToken::new();
        self.running.insert(job_id, token.clone());

        let runner = Arc::clone(&self.runner);
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            drive(runner, job, token).await;
            running.remove(&job_id);
        });

        tracing::info!(job_id = %job_id, file_name = %file_name, uploader_id = %uploader_id, "salary import queued");
        Ok(job_id)
    }

    /// Returns the latest progress, or `unknown` for unrecognized or
    /// expired ids.
    #[must_use]
    pub fn poll(&self, job_id: Uuid) -> ImportProgress {
        self.runner
            .progress()
            .get(job_id)
            .unwrap_or_else(ImportProgress::unknown)
    }

    /// Returns true while the job's worker is alive.
    #[must_use]
    pub fn is_running(&self, job_id: Uuid) -> bool {
        self.running.contains_key(&job_id)
    }

    /// Number of live workers.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Asks a running job to stop. The job ends in `error` with
    /// "import cancelled"; rows already written stay.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::JobNotRunning` if the job already ended or never
    /// existed.
    pub fn cancel(&self, job_id: Uuid) -> Result<(), ImportError> {
        let token = self
            .running
            .get(&job_id)
            .ok_or(ImportError::JobNotRunning(job_id))?;
        token.cancel();
        tracing::info!(job_id = %job_id, "salary import cancellation requested");
        Ok(())
    }

    /// Cancels every running job.
    pub fn cancel_all(&self) {
        for entry in self.running.iter() {
            entry.value().cancel();
        }
    }
}

async fn drive<R: PayrollRepository + 'static>(
    runner: Arc<ImportRunner<R>>,
    job: ImportJob,
    token: CancellationToken,
) {
    let outcome = tokio::select! {
        () = token.cancelled() => Err(ImportError::Cancelled),
        result = AssertUnwindSafe(runner.run(&job)).catch_unwind() => {
            result.unwrap_or_else(|_| Err(ImportError::WorkerPanicked))
        }
    };

    // The staged file goes before the terminal status, so a finished job
    // never has an upload left behind.
    if let Err(err) = runner.staging().remove(&job.staged_key).await {
        tracing::warn!(job_id = %job.id, key = %job.staged_key, error = %err, "failed to remove staged upload");
    }

    match outcome {
        Ok(summary) => {
            runner
                .progress()
                .put(job.id, ImportProgress::done(summary.processed, summary.processed));
            tracing::info!(
                job_id = %job.id,
                processed = summary.processed,
                created_accounts = summary.created_accounts,
                month = %summary.month,
                "salary import done"
            );
        }
        Err(err) => {
            tracing::warn!(job_id = %job.id, error = %err, "salary import failed");
            let last = runner
                .progress()
                .get(job.id)
                .unwrap_or_else(ImportProgress::queued);
            runner.progress().put(job.id, last.failed(err.to_string()));
        }
    }
}
