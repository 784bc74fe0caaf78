//! Failure reporting for the CI step
//!
//! A failed run prints one `::error::` workflow command on stdout, which the
//! runner turns into an annotation and a failed step, followed by
//! human-readable tips on stderr.

use colored::Colorize;
use db_cleanup_core::CleanupError;

/// Cargo-style diagnostic for a failed run.
///
/// ```text
/// ::error::Failed to fetch databases: 401 Unauthorized
/// error: Failed to fetch databases: 401 Unauthorized
///
///   tip: Check that service_token is valid and has access to this project
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    pub fn from_error(err: &anyhow::Error) -> Self {
        let tips = err
            .downcast_ref::<CleanupError>()
            .map(suggestions)
            .unwrap_or_default();

        Self {
            message: format!("{:#}", err),
            tips,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    /// The `::error::` workflow command for this failure
    pub fn annotation(&self) -> String {
        format!("::error::{}", escape_data(&self.message))
    }

    pub fn print(&self) {
        println!("{}", self.annotation());

        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message());
        for tip in self.tips() {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Escape a workflow command payload
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Hints for resolving a failed run
pub fn suggestions(err: &CleanupError) -> Vec<String> {
    if err.is_unauthorized() {
        return vec![
            "Check that service_token is valid and has access to this project".to_string(),
            "Rotate the token secret if it was revoked".to_string(),
        ];
    }

    match err {
        CleanupError::Configuration(message) if message.starts_with("timeout_secs") => {
            vec!["Pass a positive --timeout-secs (the default is 30)".to_string()]
        }
        CleanupError::Configuration(_) => vec![
            "Pass service_token and project_id as step inputs (or --service-token/--project-id)"
                .to_string(),
            "Outside of pull requests, GITHUB_RUN_NUMBER or database_name is needed to pick a name"
                .to_string(),
        ],
        CleanupError::ConfigFile { path, .. } => vec![
            format!("Check that {} is valid TOML", path),
            "Supported keys: api_url, timeout_secs".to_string(),
        ],
        CleanupError::Network { status: 404, .. } => {
            vec!["Verify project_id refers to an existing project".to_string()]
        }
        CleanupError::Deletion { status: 404, .. } => vec![
            "The database id may already be deleted; database_id is not looked up before deleting"
                .to_string(),
        ],
        CleanupError::Timeout { .. } => vec![
            "Raise the deadline with --timeout-secs if the provider is slow".to_string(),
        ],
        CleanupError::NetworkTransport(_) | CleanupError::DeletionTransport(_) => vec![
            "Check network connectivity from the runner".to_string(),
            "Verify the API URL (--api-url / DB_CLEANUP_API_URL)".to_string(),
        ],
        _ => vec![],
    }
}
