//! GitHub implementation of the [`Forge`] trait using reqwest for workflow
//! run lookups and raw file content retrieval.
use async_trait::async_trait;
use reqwest::{
    Client, Url,
    header::{HeaderMap, HeaderValue},
};
use secrecy::ExposeSecret;

use crate::{
    config::Config,
    forge::{
        traits::Forge,
        types::{WorkflowRun, WorkflowRunsResponse},
    },
    result::Result,
};

const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub Actions API client scoped to one repository.
pub struct Github {
    client: Client,
    base_url: Url,
}

impl Github {
    /// Create a GitHub client with bearer-token authentication and the
    /// pinned API version header on every request.
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.token.expose_secret();

        let mut headers = HeaderMap::new();

        let token_value =
            HeaderValue::from_str(format!("Bearer {}", token).as_str())?;

        headers.append("Authorization", token_value);
        headers.append(
            "Accept",
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.append(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(&format!(
            "{}/repos/{}/",
            config.api_url.trim_end_matches('/'),
            config.repository
        ))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Forge for Github {
    async fn get_workflow_run(&self, run_id: &str) -> Result<WorkflowRun> {
        let url = self.base_url.join(&format!("actions/runs/{run_id}"))?;

        let run = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<WorkflowRun>()
            .await?;

        Ok(run)
    }

    async fn list_successful_runs_before(
        &self,
        run: &WorkflowRun,
    ) -> Result<Vec<WorkflowRun>> {
        let url = Url::parse(&format!("{}/runs", run.workflow_url))?;

        let listing = self
            .client
            .get(url)
            .query(&[
                ("status", "success"),
                ("created", &format!("<={}", run.created_at)),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<WorkflowRunsResponse>()
            .await?;

        Ok(listing.workflow_runs)
    }

    async fn get_file_at_ref(&self, path: &str, sha: &str) -> Result<String> {
        let url = self.base_url.join(&format!("contents/{path}"))?;

        let content = self
            .client
            .get(url)
            .query(&[("ref", sha)])
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(content)
    }
}
