//! Formatting and webhook delivery of new changelog entries.
use async_trait::async_trait;
use log::*;
use reqwest::Client;
use serde::Serialize;

use crate::{changelog::ChangelogEntry, result::Result};

/// Discord message flag that suppresses link-preview embeds.
const SUPPRESS_EMBEDS: u32 = 1 << 2;

/// Delivery seam for the notification endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, content: &str) -> Result<()>;
}

/// Render new entries as the notification message body.
///
/// Entries arrive in chronological order, so grouping only merges
/// *consecutive* same-author runs: an author appearing in two separate
/// stretches gets two headers. Each group is a header line followed by one
/// emoji-prefixed line per change.
pub fn format_message(entries: &[ChangelogEntry]) -> String {
    let mut content = String::new();
    let mut current_author: Option<&str> = None;

    for entry in entries {
        if current_author != Some(entry.author.as_str()) {
            content.push_str(&format!("**{}** updated:\n", entry.author));
            current_author = Some(entry.author.as_str());
        }

        for change in &entry.changes {
            content.push_str(&format!(
                "{} {}\n",
                change.kind.emoji(),
                change.message
            ));
        }
    }

    content
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
    flags: u32,
}

/// Posts formatted changelog updates to a Discord webhook.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    /// Deliver the message body with all mention parsing disabled and
    /// embeds suppressed. Delivery failures are logged and swallowed: a
    /// lost notification must not fail the publish job.
    async fn send(&self, content: &str) -> Result<()> {
        let body = WebhookBody {
            content,
            allowed_mentions: AllowedMentions { parse: vec![] },
            flags: SUPPRESS_EMBEDS,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await;

        match response.and_then(|r| r.error_for_status()) {
            Ok(_) => debug!("delivered changelog notification"),
            Err(err) => warn!("webhook delivery failed: {err}"),
        }

        Ok(())
    }
}
