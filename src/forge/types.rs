//! Response types for the GitHub Actions REST API.
use serde::Deserialize;

/// Head commit reference attached to a workflow run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeadCommit {
    pub id: String,
}

/// A workflow run as returned by the Actions API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub created_at: String,
    pub head_commit: HeadCommit,
    /// API URL of the workflow this run belongs to; run listings for the
    /// same workflow hang off of it.
    pub workflow_url: String,
}

/// Envelope for the run-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunsResponse {
    pub workflow_runs: Vec<WorkflowRun>,
}
