//! Custom error types for changelog-herald.

use thiserror::Error;

/// Main error type for changelog-herald operations.
#[derive(Error, Debug)]
pub enum HeraldError {
    // Configuration errors
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    // Run locator errors
    #[error("no prior successful publish run found")]
    NoPriorRun,

    // Changelog parse/merge errors
    #[error("changelog parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("unparseable changelog timestamp: {0:?}")]
    BadTimestamp(String),

    #[error("changelog key {0:?} is not a sequence in both documents")]
    UnmergeableKey(String),
}
