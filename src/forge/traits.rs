//! Trait seam for the source-hosting API.
use async_trait::async_trait;

use crate::{forge::types::WorkflowRun, result::Result};

/// Hosting-API operations the notification pipeline needs. Kept behind a
/// trait so tests can inject fakes for the HTTP collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Fetch a single workflow run by id.
    async fn get_workflow_run(&self, run_id: &str) -> Result<WorkflowRun>;

    /// List successful runs of the same workflow created at or before the
    /// given run. The API returns them newest first.
    async fn list_successful_runs_before(
        &self,
        run: &WorkflowRun,
    ) -> Result<Vec<WorkflowRun>>;

    /// Fetch raw file content at a commit.
    async fn get_file_at_ref(&self, path: &str, sha: &str) -> Result<String>;
}
