//! Source-hosting API access for workflow runs and historical file content.
pub mod github;
pub mod traits;
pub mod types;
