//! Database name derivation and sanitization
//!
//! Provider database names only allow lowercase ASCII letters, digits and
//! underscores. Names coming from branches (`feature/x`) or explicit inputs
//! are folded into that alphabet with [`sanitize_database_name`].

use crate::context::CiContext;
use crate::error::{CleanupError, Result};

/// Prefix used when the target is addressed by id and no name is known
pub const ID_NAME_PREFIX: &str = "database-";

/// Fold a raw name into the provider's `[a-z0-9_]` alphabet.
///
/// Separators (`/`, `-`) become `_` first, then the string is lowercased,
/// then anything left outside the alphabet is dropped. The result may be
/// empty.
///
/// ```rust
/// use db_cleanup_core::sanitize_database_name;
///
/// assert_eq!(sanitize_database_name("My-Cool/Branch"), "my_cool_branch");
/// assert_eq!(sanitize_database_name("!!!"), "");
/// ```
pub fn sanitize_database_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '/' || c == '-' { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Build the unsanitized name for a run that has no explicit name.
///
/// Pull requests get `pr-<number>-<branch>`, every other event gets
/// `test-<run_number>`.
pub fn derive_raw_name(context: &CiContext) -> Result<String> {
    if let Some(pr) = &context.pull_request {
        return Ok(format!("pr-{}-{}", pr.number, pr.head_ref));
    }

    match context.run_number {
        Some(run_number) => Ok(format!("test-{}", run_number)),
        None => Err(CleanupError::Configuration(
            "cannot derive a database name: no pull request and no run number in the CI context"
                .to_string(),
        )),
    }
}

/// Name reported for a target that was addressed by id
pub fn name_for_id(database_id: &str) -> String {
    format!("{}{}", ID_NAME_PREFIX, database_id)
}
