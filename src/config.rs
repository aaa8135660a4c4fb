//! Environment-based process configuration.
//!
//! The job runs inside GitHub Actions and picks everything up from the
//! standard Actions environment plus one webhook variable. Configuration is
//! gathered once at startup into an explicit [`Config`] so the pipeline
//! components never reach into the environment themselves.

use secrecy::SecretString;
use std::env;

use crate::{error::HeraldError, result::Result};

/// Default base URL for the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository-relative path of the primary changelog file.
pub const CHANGELOG_FILE: &str = "Resources/Changelog/DeltaVChangelog.yml";

/// Repository-relative path of the upstream changelog file.
pub const CHANGELOG_FILE_UPSTREAM: &str = "Resources/Changelog/Changelog.yml";

/// Process configuration for one notification run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    pub api_url: String,
    /// Repository in `owner/repo` form.
    pub repository: String,
    /// Id of the workflow run this job executes in.
    pub run_id: String,
    /// Access token for hosting-API calls.
    pub token: SecretString,
    /// Discord webhook address. `None` means notifications are disabled.
    pub webhook_url: Option<String>,
    /// Path of the primary changelog, both in the working tree and in the
    /// repository at a historical ref.
    pub changelog_file: String,
    /// Path of the upstream changelog.
    pub changelog_file_upstream: String,
}

impl Config {
    /// Build configuration from the process environment. Missing required
    /// variables are fatal. An unset or empty `DISCORD_WEBHOOK_URL` is the
    /// valid "disabled" state, not an error.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let repository = required("GITHUB_REPOSITORY")?;
        let run_id = required("GITHUB_RUN_ID")?;
        let token = SecretString::from(required("GITHUB_TOKEN")?);
        let webhook_url = env::var("DISCORD_WEBHOOK_URL")
            .ok()
            .filter(|value| !value.is_empty());

        Ok(Self {
            api_url,
            repository,
            run_id,
            token,
            webhook_url,
            changelog_file: CHANGELOG_FILE.to_string(),
            changelog_file_upstream: CHANGELOG_FILE_UPSTREAM.to_string(),
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| HeraldError::MissingEnvVar(name.to_string()).into())
}
