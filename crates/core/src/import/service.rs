//! Import worker: turns one staged spreadsheet into salary statements.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use payroll_shared::BusinessClock;
use uuid::Uuid;

use super::columns::ColumnLayout;
use super::error::ImportError;
use super::progress::{ImportProgress, ProgressStore};
use super::sheet::{Sheet, parse_sheet};
use super::types::{ImportJob, ImportSummary, NewSalaryStatement, NewUploadLog};
use crate::account::{DEFAULT_PASSWORD, EmployeeAccount, NewEmployee, ProfileUpdate, hash_password};
use crate::storage::StagingStore;

/// Progress is published every this many rows, and on the last row.
pub const PROGRESS_EVERY: u64 = 10;

/// Repository trait for import persistence.
///
/// This trait is implemented by the db crate. Calls are not wrapped in one
/// transaction: a failure mid-file leaves the rows written so far.
pub trait PayrollRepository: Send + Sync {
    /// Delete every statement filed under `month`, returning how many.
    fn delete_statements_for_month(
        &self,
        month: NaiveDate,
    ) -> impl Future<Output = Result<u64, ImportError>> + Send;

    /// Find the account with this employee id, or create it with
    /// `password_hash` and a forced password change. The flag is true when
    /// the account was created.
    fn find_or_create_employee(
        &self,
        employee: &NewEmployee,
        password_hash: &str,
    ) -> impl Future<Output = Result<(EmployeeAccount, bool), ImportError>> + Send;

    /// Apply a non-empty profile update.
    fn update_profile(
        &self,
        account_id: Uuid,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), ImportError>> + Send;

    /// Create one statement.
    fn create_statement(
        &self,
        statement: &NewSalaryStatement,
    ) -> impl Future<Output = Result<Uuid, ImportError>> + Send;

    /// Record the upload once the whole file is in.
    fn record_upload(
        &self,
        log: &NewUploadLog,
    ) -> impl Future<Output = Result<(), ImportError>> + Send;
}

/// Runs import jobs against a repository.
pub struct ImportRunner<R: PayrollRepository> {
    repo: Arc<R>,
    staging: Arc<StagingStore>,
    progress: Arc<dyn ProgressStore>,
    clock: BusinessClock,
}

impl<R: PayrollRepository> ImportRunner<R> {
    /// Create a new runner.
    #[must_use]
    pub fn new(
        repo: Arc<R>,
        staging: Arc<StagingStore>,
        progress: Arc<dyn ProgressStore>,
        clock: BusinessClock,
    ) -> Self {
        Self {
            repo,
            staging,
            progress,
            clock,
        }
    }

    /// Imports the staged file of `job`.
    ///
    /// Statements of the current month are deleted before the first row is
    /// written, so re-uploading a month replaces it. Progress is published
    /// as rows go in. The caller removes the staged file and only then
    /// publishes the terminal `done` or `error` status.
    ///
    /// # Errors
    ///
    /// Returns the first error met; the rows before it stay written.
    pub async fn run(&self, job: &ImportJob) -> Result<ImportSummary, ImportError> {
        self.progress.put(job.id, ImportProgress::running(0, 0));

        let sheet = self.load_sheet(job).await?;
        let total = sheet.len() as u64;
        self.progress.put(job.id, ImportProgress::running(0, total));

        // Layout first: a file with a missing column must not wipe the month.
        let layout = ColumnLayout::resolve(&sheet.headers)?;

        let month = self.clock.current_month();
        let replaced_statements = self.repo.delete_statements_for_month(month).await?;
        tracing::info!(
            job_id = %job.id,
            month = %month,
            replaced = replaced_statements,
            rows = total,
            "importing salary sheet"
        );

        let password_hash = tokio::task::spawn_blocking(|| hash_password(DEFAULT_PASSWORD))
            .await
            .map_err(|_| ImportError::WorkerPanicked)?
            .map_err(|e| ImportError::Password(e.to_string()))?;

        let mut processed = 0;
        let mut created_accounts = 0;
        for sheet_row in &sheet.rows {
            let row = layout.extract(sheet_row.number, &sheet_row.cells)?;

            let identity = NewEmployee::from_sheet(&row.employee_id, &row.full_name);
            let (account, created) = self
                .repo
                .find_or_create_employee(&identity, &password_hash)
                .await?;
            if created {
                created_accounts += 1;
            }

            let update = ProfileUpdate::diff(&account, &row.profile);
            if !update.is_empty() {
                self.repo.update_profile(account.id, &update).await?;
            }

            self.repo
                .create_statement(&NewSalaryStatement {
                    user_id: account.id,
                    month,
                    line_items: row.line_items,
                    notes: row.notes,
                })
                .await?;

            processed += 1;
            if processed % PROGRESS_EVERY == 0 || processed == total {
                self.progress
                    .put(job.id, ImportProgress::running(processed, total));
            }
        }

        self.repo
            .record_upload(&NewUploadLog {
                uploader_id: job.uploader_id,
                file_name: job.file_name.clone(),
                sheet_name: sheet.name.clone(),
                month,
            })
            .await?;

        Ok(ImportSummary {
            processed,
            created_accounts,
            replaced_statements,
            month,
        })
    }

    async fn load_sheet(&self, job: &ImportJob) -> Result<Sheet, ImportError> {
        let bytes = self.staging.read(&job.staged_key).await?;
        let file_name = job.file_name.clone();
        tokio::task::spawn_blocking(move || parse_sheet(&bytes, &file_name))
            .await
            .map_err(|_| ImportError::WorkerPanicked)?
    }

    /// Returns the staging store.
    #[must_use]
    pub fn staging(&self) -> &StagingStore {
        &self.staging
    }

    /// Returns the progress store.
    #[must_use]
    pub fn progress(&self) -> &Arc<dyn ProgressStore> {
        &self.progress
    }
}
