//! # db-cleanup-core
//!
//! Library behind the `db-cleanup` CI step. A run deletes one database from a
//! provider project, chosen either by explicit id or by a name derived from
//! the triggering event:
//!
//! 1. **Validate** the step inputs (`service_token`, `project_id`).
//! 2. **Resolve** the target with a [`ResolutionStrategy`]: an explicit
//!    `database_id` is used as-is, otherwise a name (explicit, or
//!    `pr-<n>-<branch>` / `test-<run>`) is sanitized and looked up.
//! 3. **Delete** the resolved database.
//! 4. **Report** `deleted` and `database_name` through an [`OutputSink`].
//!
//! ```rust,ignore
//! use db_cleanup_core::{CiContext, DatabaseCleanupOperation, ProviderClient, ProviderConfig};
//!
//! let config = ProviderConfig::default();
//! let outcome = DatabaseCleanupOperation::new(CiContext::from_env()?)
//!     .with_timeout(config.timeout())
//!     .execute(|token| ProviderClient::new(&config, token))
//!     .await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod inputs;
pub mod naming;
pub mod operation;
pub mod outputs;
pub mod provider;

pub use config::ProviderConfig;
pub use context::{CiContext, InputStore, PullRequest};
pub use error::{CleanupError, Result};
pub use inputs::{OperationInputs, ResolutionStrategy, ValidatedInputs};
pub use naming::{derive_raw_name, sanitize_database_name};
pub use operation::{
    CleanupOutcome, DatabaseCleanupOperation, Resolution, ResolutionMethod, ResolvedTarget,
};
pub use outputs::{GithubOutputFile, MemorySink, OutputSink, StdoutSink, publish_outputs};
pub use provider::{DatabaseProvider, DatabaseRecord, ProviderClient};
