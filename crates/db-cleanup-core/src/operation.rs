//! The cleanup operation: validate, resolve, delete, report
//!
//! A run moves through these states exactly once:
//!
//! ```text
//! Validating ─┬─> Fail
//!             └─> Resolving ─┬─> ResolvedById ───┐
//!                            ├─> ResolvedByName ─┴─> Deleting ─┬─> Reported
//!                            └─> NotFound ─────────> Reported  └─> Fail
//! ```
//!
//! Nothing is retried. Any error aborts the run and no outputs are produced.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::context::CiContext;
use crate::error::{CleanupError, Result};
use crate::inputs::{DATABASE_ID, DATABASE_NAME, OperationInputs, ResolutionStrategy};
use crate::naming::{name_for_id, sanitize_database_name};
use crate::outputs::{OutputSink, publish_outputs};
use crate::provider::{DatabaseProvider, find_by_name};

/// How a target was located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    Id,
    Name,
}

/// The database a run will delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub id: String,
    pub name: String,
    pub resolution_method: ResolutionMethod,
}

/// Result of the resolving step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedTarget),
    /// No database carries this (sanitized) name
    NotFound { name: String },
}

/// Observable result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub deleted: bool,
    pub database_name: String,
}

impl CleanupOutcome {
    /// Publish `deleted` and `database_name` for downstream steps
    pub fn publish(&self, sink: &dyn OutputSink) -> std::io::Result<()> {
        publish_outputs(sink, self.deleted, &self.database_name)
    }
}

/// Deletes one database chosen from the step inputs and CI context
#[derive(Debug, Clone)]
pub struct DatabaseCleanupOperation {
    context: CiContext,
    timeout: Duration,
}

impl DatabaseCleanupOperation {
    pub fn new(context: CiContext) -> Self {
        Self {
            context,
            timeout: ProviderConfig::default().timeout(),
        }
    }

    /// Deadline applied to each provider call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the whole cleanup.
    ///
    /// `connect` receives the validated service token and builds the
    /// provider. It is only called once the inputs are known to be usable,
    /// so a configuration error never reaches the network.
    pub async fn execute<P, F>(&self, connect: F) -> Result<CleanupOutcome>
    where
        P: DatabaseProvider,
        F: FnOnce(&str) -> Result<P>,
    {
        let inputs = OperationInputs::from_store(&self.context.inputs).validate()?;
        debug!("Validated inputs: {:?}", inputs);

        let strategy = ResolutionStrategy::choose(&inputs, &self.context)?;
        if matches!(strategy, ResolutionStrategy::ById(_)) && inputs.database_name.is_some() {
            info!(
                "Both {} and {} provided, using {}",
                DATABASE_ID, DATABASE_NAME, DATABASE_ID
            );
        }

        let provider = connect(&inputs.service_token)?;

        match self
            .resolve(&provider, &inputs.project_id, &strategy)
            .await?
        {
            Resolution::Found(target) => {
                self.delete(&provider, &target).await?;
                Ok(CleanupOutcome {
                    deleted: true,
                    database_name: target.name,
                })
            }
            Resolution::NotFound { name } => {
                info!("No database found with name: {}", name);
                Ok(CleanupOutcome {
                    deleted: false,
                    database_name: name,
                })
            }
        }
    }

    /// Turn a strategy into a target. Only the by-name strategy queries the
    /// provider.
    pub async fn resolve<P: DatabaseProvider>(
        &self,
        provider: &P,
        project_id: &str,
        strategy: &ResolutionStrategy,
    ) -> Result<Resolution> {
        match strategy {
            ResolutionStrategy::ById(id) => {
                let target = ResolvedTarget {
                    id: id.clone(),
                    name: name_for_id(id),
                    resolution_method: ResolutionMethod::Id,
                };
                info!("Targeting database by id: {}", target.id);
                Ok(Resolution::Found(target))
            }
            ResolutionStrategy::ByName(raw) => {
                let name = sanitize_database_name(raw);
                if name != *raw {
                    debug!("Sanitized database name {:?} -> {:?}", raw, name);
                }
                info!("Looking for database to cleanup: {}", name);

                let records = self
                    .with_deadline("list databases", provider.list_databases(project_id))
                    .await?;

                Ok(match find_by_name(&records, &name) {
                    Some(db) => {
                        info!("Database {} exists with ID: {}", name, db.id);
                        Resolution::Found(ResolvedTarget {
                            id: db.id.clone(),
                            name,
                            resolution_method: ResolutionMethod::Name,
                        })
                    }
                    None => Resolution::NotFound { name },
                })
            }
        }
    }

    async fn delete<P: DatabaseProvider>(&self, provider: &P, target: &ResolvedTarget) -> Result<()> {
        info!("Deleting database {} ({})...", target.name, target.id);
        self.with_deadline("delete database", provider.delete_database(&target.id))
            .await?;
        info!("Database {} deleted successfully", target.name);
        Ok(())
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CleanupError::Timeout {
                operation,
                timeout: self.timeout,
            })?
    }
}
