//! Result type used throughout changelog-herald.
//!
//! Type alias for `color_eyre::eyre::Result<T>`, giving every fallible
//! function colorized error reports and chain-able `.wrap_err()` context.

use color_eyre::eyre::Result as EyreResult;

/// Standard result type used throughout changelog-herald.
pub type Result<T> = EyreResult<T>;
