//! Pipeline orchestration for one notification run.
//!
//! Sequential stages, mirroring the publish job: locate the prior successful
//! run, reconstruct the merged changelog at its commit, merge the working
//! tree's changelog files, diff, format, deliver.
use color_eyre::eyre::WrapErr;
use log::*;

use crate::{
    changelog::{self, ChangelogDocument},
    config::Config,
    error::HeraldError,
    forge::{traits::Forge, types::WorkflowRun},
    notify::{self, Notifier},
    result::Result,
};

/// Run the notification pipeline end to end.
pub async fn execute(
    config: &Config,
    forge: &dyn Forge,
    notifier: &dyn Notifier,
) -> Result<()> {
    if config.webhook_url.is_none() {
        info!("no webhook configured: skipping changelog notification");
        return Ok(());
    }

    let prior = find_prior_publish(config, forge).await?;
    let last_sha = prior.head_commit.id.clone();

    info!("last successful publish run was {}: {}", prior.id, last_sha);

    let old = fetch_merged_changelog(config, forge, &last_sha).await?;
    let current = load_merged_changelog(config).await?;

    let new_entries = changelog::diff(&old, &current);

    debug!(
        "{} new changelog entries since last publish",
        new_entries.len()
    );

    let content = notify::format_message(&new_entries);

    if content.is_empty() {
        info!("no new changelog entries: nothing to send");
        return Ok(());
    }

    notifier.send(&content).await
}

/// Find the nearest successful run of this workflow preceding the current
/// one. The listing is newest first, so the first non-current entry wins.
async fn find_prior_publish(
    config: &Config,
    forge: &dyn Forge,
) -> Result<WorkflowRun> {
    let current = forge.get_workflow_run(&config.run_id).await?;
    let past = forge.list_successful_runs_before(&current).await?;

    past.into_iter()
        .find(|run| run.id != current.id)
        .ok_or_else(|| HeraldError::NoPriorRun.into())
}

/// Reconstruct the merged changelog as of a historical commit, fetching both
/// files through the hosting API (publish builds run on shallow clones, so
/// the commit is not available locally).
async fn fetch_merged_changelog(
    config: &Config,
    forge: &dyn Forge,
    sha: &str,
) -> Result<ChangelogDocument> {
    let primary_text =
        forge.get_file_at_ref(&config.changelog_file, sha).await?;
    let upstream_text = forge
        .get_file_at_ref(&config.changelog_file_upstream, sha)
        .await?;

    let primary = changelog::parse_document(&primary_text)?;
    let upstream = changelog::parse_document(&upstream_text)?;

    changelog::merge(&primary, &upstream)
}

/// Build the merged changelog from the working tree's two files.
async fn load_merged_changelog(config: &Config) -> Result<ChangelogDocument> {
    let primary_text = tokio::fs::read_to_string(&config.changelog_file)
        .await
        .wrap_err_with(|| {
            format!("failed to read {}", config.changelog_file)
        })?;
    let upstream_text =
        tokio::fs::read_to_string(&config.changelog_file_upstream)
            .await
            .wrap_err_with(|| {
                format!("failed to read {}", config.changelog_file_upstream)
            })?;

    let primary = changelog::parse_document(&primary_text)?;
    let upstream = changelog::parse_document(&upstream_text)?;

    changelog::merge(&primary, &upstream)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use std::fs;
    use tempfile::TempDir;

    use super::*;
    use crate::forge::{traits::MockForge, types::HeadCommit};
    use crate::notify::MockNotifier;

    const OLD_PRIMARY: &str = r#"
Entries:
- id: 1
  time: '2024-01-01T00:00:00Z'
  author: Ada
  changes:
  - type: Add
    message: Added the station.
- id: 2
  time: '2024-01-03T00:00:00Z'
  author: Ada
  changes:
  - type: Fix
    message: Fixed the station.
"#;

    const OLD_UPSTREAM: &str = r#"
Entries:
- id: 1
  time: '2024-01-02T00:00:00Z'
  author: Brin
  changes:
  - type: Tweak
    message: Tweaked gravity.
"#;

    const NEW_PRIMARY_ENTRY: &str = r#"- id: 3
  time: '2024-01-05T00:00:00Z'
  author: Ada
  changes:
  - type: Add
    message: Added teleporters.
"#;

    const NEW_UPSTREAM_ENTRY: &str = r#"- id: 2
  time: '2024-01-04T00:00:00Z'
  author: Brin
  changes:
  - type: Remove
    message: Removed clowns.
"#;

    fn test_config(dir: &TempDir, webhook: bool) -> Config {
        Config {
            api_url: "https://api.github.com".to_string(),
            repository: "example/station".to_string(),
            run_id: "100".to_string(),
            token: SecretString::from("test-token".to_string()),
            webhook_url: webhook
                .then(|| "https://discord.example.com/api/webhooks/1/abc".to_string()),
            changelog_file: dir
                .path()
                .join("Primary.yml")
                .to_string_lossy()
                .into_owned(),
            changelog_file_upstream: dir
                .path()
                .join("Upstream.yml")
                .to_string_lossy()
                .into_owned(),
        }
    }

    fn write_working_tree(
        config: &Config,
        primary: &str,
        upstream: &str,
    ) {
        fs::write(&config.changelog_file, primary).unwrap();
        fs::write(&config.changelog_file_upstream, upstream).unwrap();
    }

    fn run(id: u64, sha: &str) -> WorkflowRun {
        WorkflowRun {
            id,
            created_at: "2024-01-05T12:00:00Z".to_string(),
            head_commit: HeadCommit {
                id: sha.to_string(),
            },
            workflow_url:
                "https://api.github.com/repos/example/station/actions/workflows/11"
                    .to_string(),
        }
    }

    fn mock_forge_with_history(config: &Config) -> MockForge {
        let mut mock_forge = MockForge::new();

        let current = run(100, "current-sha");
        let current_clone = current.clone();
        mock_forge
            .expect_get_workflow_run()
            .withf(|run_id| run_id == "100")
            .returning(move |_| Ok(current_clone.clone()));

        let listing = vec![current.clone(), run(99, "prior-sha")];
        mock_forge
            .expect_list_successful_runs_before()
            .withf(|run| run.id == 100)
            .returning(move |_| Ok(listing.clone()));

        let primary_path = config.changelog_file.clone();
        mock_forge
            .expect_get_file_at_ref()
            .withf(move |path, sha| path == primary_path && sha == "prior-sha")
            .returning(|_, _| Ok(OLD_PRIMARY.to_string()));

        let upstream_path = config.changelog_file_upstream.clone();
        mock_forge
            .expect_get_file_at_ref()
            .withf(move |path, sha| {
                path == upstream_path && sha == "prior-sha"
            })
            .returning(|_, _| Ok(OLD_UPSTREAM.to_string()));

        mock_forge
    }

    #[test_log::test(tokio::test)]
    async fn test_execute_sends_new_entries() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, true);

        write_working_tree(
            &config,
            &format!("{OLD_PRIMARY}{NEW_PRIMARY_ENTRY}"),
            &format!("{OLD_UPSTREAM}{NEW_UPSTREAM_ENTRY}"),
        );

        let mock_forge = mock_forge_with_history(&config);

        let mut mock_notifier = MockNotifier::new();
        mock_notifier
            .expect_send()
            .withf(|content| {
                content
                    == "**Brin** updated:\n\
                        ❌ Removed clowns.\n\
                        **Ada** updated:\n\
                        🆕 Added teleporters.\n"
            })
            .times(1)
            .returning(|_| Ok(()));

        execute(&config, &mock_forge, &mock_notifier)
            .await
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_execute_skips_when_webhook_disabled() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, false);

        // No expectations: any forge or notifier call fails the test.
        let mock_forge = MockForge::new();
        let mock_notifier = MockNotifier::new();

        execute(&config, &mock_forge, &mock_notifier)
            .await
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_execute_skips_post_when_no_new_entries() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, true);

        write_working_tree(&config, OLD_PRIMARY, OLD_UPSTREAM);

        let mock_forge = mock_forge_with_history(&config);
        let mock_notifier = MockNotifier::new();

        execute(&config, &mock_forge, &mock_notifier)
            .await
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_execute_fails_without_prior_run() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, true);

        let mut mock_forge = MockForge::new();

        let current = run(100, "current-sha");
        let current_clone = current.clone();
        mock_forge
            .expect_get_workflow_run()
            .returning(move |_| Ok(current_clone.clone()));

        // Listing only contains the current run itself.
        let listing = vec![current.clone()];
        mock_forge
            .expect_list_successful_runs_before()
            .returning(move |_| Ok(listing.clone()));

        let mock_notifier = MockNotifier::new();

        let err = execute(&config, &mock_forge, &mock_notifier)
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("no prior successful publish run")
        );
    }
}
