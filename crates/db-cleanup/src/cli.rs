//! Command-line interface
//!
//! Every step input can be passed as a flag or, as the Actions runner does,
//! through its `INPUT_*` environment variable. Flags win over the runner's
//! input store.

use clap::Parser;
use db_cleanup_core::InputStore;
use db_cleanup_core::inputs::{DATABASE_ID, DATABASE_NAME, PROJECT_ID, SERVICE_TOKEN};
use std::path::PathBuf;

/// Delete a preview database by id or by a name derived from the CI event
#[derive(Parser, Debug)]
#[command(name = "db-cleanup")]
#[command(version, about = "Delete a preview database created for a CI run")]
#[command(long_about = "
Delete a preview database created for a CI run

The target is chosen in this order:
    1. --database-id, deleted directly without a lookup
    2. --database-name, sanitized and looked up in the project
    3. pr-<number>-<branch> for pull request events
    4. test-<run_number> otherwise

Outputs `deleted` and `database_name` are appended to $GITHUB_OUTPUT when set,
or printed as name=value lines.

EXAMPLES:
    # Delete the database created for this pull request
    db-cleanup --service-token $TOKEN --project-id proj_123

    # Delete a known database
    db-cleanup --service-token $TOKEN --project-id proj_123 --database-id db_456
")]
pub struct Cli {
    /// Bearer token for the provider API
    #[arg(long, env = "INPUT_SERVICE_TOKEN", hide_env_values = true)]
    pub service_token: Option<String>,

    /// Project that owns the database
    #[arg(long, env = "INPUT_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Database name to look up (sanitized before matching)
    #[arg(long, env = "INPUT_DATABASE_NAME")]
    pub database_name: Option<String>,

    /// Database id to delete directly; takes precedence over --database-name
    #[arg(long, env = "INPUT_DATABASE_ID")]
    pub database_id: Option<String>,

    /// Provider API base URL
    #[arg(long, env = "DB_CLEANUP_API_URL")]
    pub api_url: Option<String>,

    /// Deadline for each provider call, in seconds
    #[arg(long, env = "DB_CLEANUP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Path to a TOML file with provider settings
    #[arg(long, env = "DB_CLEANUP_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Copy the inputs given on the command line into the input store
    pub fn apply_inputs(&self, store: &mut InputStore) {
        let pairs = [
            (SERVICE_TOKEN, &self.service_token),
            (PROJECT_ID, &self.project_id),
            (DATABASE_NAME, &self.database_name),
            (DATABASE_ID, &self.database_id),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                store.set(name, value.as_str());
            }
        }
    }
}
