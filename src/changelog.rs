//! Changelog document model, merge, and diff.
//!
//! Two changelog files are maintained independently: a primary one owned by
//! this repository and an upstream one that gets pulled in with merges. Both
//! may assign overlapping entry ids, so merging concatenates the documents,
//! orders the combined `Entries` by time, and renumbers ids to their 1-based
//! position in that order. The diff against a historical snapshot then keys
//! on those merge-assigned ids.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

use crate::{error::HeraldError, result::Result};

/// Change categories recognized by the notifier. Anything else is carried
/// through as [`ChangeType::Unknown`] rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ChangeType {
    Fix,
    Add,
    Remove,
    Tweak,
    Unknown(String),
}

impl From<String> for ChangeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Fix" => Self::Fix,
            "Add" => Self::Add,
            "Remove" => Self::Remove,
            "Tweak" => Self::Tweak,
            _ => Self::Unknown(value),
        }
    }
}

impl ChangeType {
    /// Emoji prefix used when formatting a change line.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Fix => "🐛",
            Self::Add => "🆕",
            Self::Remove => "❌",
            Self::Tweak => "⚒️",
            Self::Unknown(_) => "❓",
        }
    }
}

/// A single change line within an entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeType,
    pub message: String,
}

/// One dated record of notable changes attributed to an author.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangelogEntry {
    pub id: u64,
    /// Raw timestamp string; parsed lazily when the merge sorts entries.
    pub time: String,
    pub author: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// A parsed changelog file: the `Entries` sequence plus whatever other
/// top-level keys the file carries, kept so merges handle them the same way
/// the changelog bot does.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangelogDocument {
    /// The `Entries` sequence; `None` when the file lacks the key entirely,
    /// which the merge treats as fatal like any other unmergeable key.
    #[serde(rename = "Entries")]
    pub entries: Option<Vec<ChangelogEntry>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ChangelogDocument {
    /// Entries in document order, empty when the key is absent.
    pub fn entries(&self) -> &[ChangelogEntry] {
        self.entries.as_deref().unwrap_or_default()
    }
}

/// Parse one changelog YAML document.
pub fn parse_document(text: &str) -> Result<ChangelogDocument> {
    let document = serde_yaml::from_str(text).map_err(HeraldError::from)?;
    Ok(document)
}

/// Parse an entry timestamp. The changelog bot writes RFC 3339 (with
/// seven-digit fractional seconds); older hand-edited entries use a handful
/// of looser formats.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }

    if let Ok(parsed) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(midnight) = parsed.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }

    Err(HeraldError::BadTimestamp(value.to_string()).into())
}

/// Merge two changelog documents into one chronologically ordered,
/// re-indexed document.
///
/// Only top-level keys present in `primary` survive: keys unique to
/// `upstream` are dropped. The combined `Entries` sequence is stable-sorted
/// by parsed time, so same-timestamp entries keep primary-before-upstream
/// order, then each entry id is overwritten with its 1-based position.
pub fn merge(
    primary: &ChangelogDocument,
    upstream: &ChangelogDocument,
) -> Result<ChangelogDocument> {
    let (Some(primary_entries), Some(upstream_entries)) =
        (primary.entries.as_deref(), upstream.entries.as_deref())
    else {
        return Err(HeraldError::UnmergeableKey("Entries".to_string()).into());
    };

    let combined =
        primary_entries.iter().chain(upstream_entries.iter()).cloned();

    let mut keyed: Vec<(DateTime<Utc>, ChangelogEntry)> = Vec::new();
    for entry in combined {
        keyed.push((parse_time(&entry.time)?, entry));
    }

    // Vec::sort_by_key is stable, which is what keeps the tie order.
    keyed.sort_by_key(|(time, _)| *time);

    let mut entries: Vec<ChangelogEntry> =
        keyed.into_iter().map(|(_, entry)| entry).collect();

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.id = (index as u64) + 1;
    }

    let mut extra = BTreeMap::new();
    for (key, value) in &primary.extra {
        extra.insert(
            key.clone(),
            concat_sequences(key, value, upstream.extra.get(key))?,
        );
    }

    Ok(ChangelogDocument {
        entries: Some(entries),
        extra,
    })
}

fn concat_sequences(
    key: &str,
    primary: &serde_yaml::Value,
    upstream: Option<&serde_yaml::Value>,
) -> Result<serde_yaml::Value> {
    let (Some(first), Some(serde_yaml::Value::Sequence(second))) =
        (primary.as_sequence(), upstream)
    else {
        return Err(HeraldError::UnmergeableKey(key.to_string()).into());
    };

    let mut combined = first.clone();
    combined.extend(second.iter().cloned());
    Ok(serde_yaml::Value::Sequence(combined))
}

/// Entries of `current` whose id does not appear in `old`, preserving
/// `current`'s (chronological) order.
pub fn diff(
    old: &ChangelogDocument,
    current: &ChangelogDocument,
) -> Vec<ChangelogEntry> {
    let seen: HashSet<u64> =
        old.entries().iter().map(|entry| entry.id).collect();

    current
        .entries()
        .iter()
        .filter(|entry| !seen.contains(&entry.id))
        .cloned()
        .collect()
}
