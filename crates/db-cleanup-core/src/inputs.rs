//! Step inputs and the resolution strategy chosen from them

use std::fmt;

use crate::context::{CiContext, InputStore};
use crate::error::{CleanupError, Result};
use crate::naming::derive_raw_name;

pub const SERVICE_TOKEN: &str = "service_token";
pub const PROJECT_ID: &str = "project_id";
pub const DATABASE_NAME: &str = "database_name";
pub const DATABASE_ID: &str = "database_id";

/// Inputs of a cleanup run, as read from the input store
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OperationInputs {
    pub service_token: Option<String>,
    pub project_id: Option<String>,
    pub database_name: Option<String>,
    pub database_id: Option<String>,
}

// Keep the token out of logs
impl fmt::Debug for OperationInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationInputs")
            .field(
                "service_token",
                &self.service_token.as_ref().map(|_| "<redacted>"),
            )
            .field("project_id", &self.project_id)
            .field("database_name", &self.database_name)
            .field("database_id", &self.database_id)
            .finish()
    }
}

/// Inputs that passed validation
#[derive(Clone)]
pub struct ValidatedInputs {
    pub service_token: String,
    pub project_id: String,
    pub database_name: Option<String>,
    pub database_id: Option<String>,
}

impl OperationInputs {
    pub fn from_store(store: &InputStore) -> Self {
        let read = |name: &str| store.get(name).map(str::to_string);
        Self {
            service_token: read(SERVICE_TOKEN),
            project_id: read(PROJECT_ID),
            database_name: read(DATABASE_NAME),
            database_id: read(DATABASE_ID),
        }
    }

    /// Check the required inputs. No I/O happens before this succeeds.
    pub fn validate(&self) -> Result<ValidatedInputs> {
        let (Some(token), Some(project)) =
            (non_empty(&self.service_token), non_empty(&self.project_id))
        else {
            return Err(CleanupError::Configuration(format!(
                "{} and {} are required",
                SERVICE_TOKEN, PROJECT_ID
            )));
        };

        // The id ends up verbatim in the published database name
        let database_id = non_empty(&self.database_id);
        if database_id.is_some_and(|id| id.chars().any(char::is_control)) {
            return Err(CleanupError::Configuration(format!(
                "{} must not contain control characters",
                DATABASE_ID
            )));
        }

        Ok(ValidatedInputs {
            service_token: token.to_string(),
            project_id: project.to_string(),
            database_name: non_empty(&self.database_name).map(str::to_string),
            database_id: database_id.map(str::to_string),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl fmt::Debug for ValidatedInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedInputs")
            .field("service_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("database_name", &self.database_name)
            .field("database_id", &self.database_id)
            .finish()
    }
}

/// How the target database is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Delete this id directly, without a lookup
    ById(String),
    /// Look up this raw (unsanitized) name in the project
    ByName(String),
}

impl ResolutionStrategy {
    /// Pick the strategy: an id always wins, then an explicit name, then a
    /// name derived from the CI event.
    pub fn choose(inputs: &ValidatedInputs, context: &CiContext) -> Result<Self> {
        if let Some(id) = &inputs.database_id {
            return Ok(ResolutionStrategy::ById(id.clone()));
        }

        match &inputs.database_name {
            Some(name) => Ok(ResolutionStrategy::ByName(name.clone())),
            None => derive_raw_name(context).map(ResolutionStrategy::ByName),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PullRequest;

    fn inputs(token: &str, project: &str) -> OperationInputs {
        OperationInputs {
            service_token: Some(token.to_string()),
            project_id: Some(project.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_requires_token_and_project() {
        let err = inputs("", "proj").validate().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "service_token and project_id are required");

        let err = OperationInputs {
            service_token: Some("tok".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.is_configuration());

        assert!(inputs("tok", "proj").validate().is_ok());
    }

    #[test]
    fn test_validate_drops_blank_optionals() {
        let mut raw = inputs("tok", "proj");
        raw.database_name = Some("  ".to_string());
        let validated = raw.validate().unwrap();
        assert!(validated.database_name.is_none());
        assert!(validated.database_id.is_none());
    }

    #[test]
    fn test_validate_rejects_control_characters_in_id() {
        let mut raw = inputs("tok", "proj");
        raw.database_id = Some("db_a\nDB_CLEANUP_EOF\nx".to_string());
        let err = raw.validate().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "database_id must not contain control characters");

        raw.database_id = Some("db_a".to_string());
        assert_eq!(raw.validate().unwrap().database_id.as_deref(), Some("db_a"));
    }

    #[test]
    fn test_from_store() {
        let mut store = InputStore::new();
        store.set("service_token", "tok");
        store.set("project_id", "proj");
        store.set("database_id", "db_1");
        let raw = OperationInputs::from_store(&store);
        assert_eq!(raw.database_id.as_deref(), Some("db_1"));
        assert!(raw.database_name.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let raw = inputs("super-secret", "proj");
        let rendered = format!("{:?}", raw);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));

        let rendered = format!("{:?}", raw.validate().unwrap());
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_choose_id_wins_over_name() {
        let mut raw = inputs("tok", "proj");
        raw.database_id = Some("db_123".to_string());
        raw.database_name = Some("named".to_string());
        let strategy =
            ResolutionStrategy::choose(&raw.validate().unwrap(), &CiContext::default()).unwrap();
        assert_eq!(strategy, ResolutionStrategy::ById("db_123".to_string()));
    }

    #[test]
    fn test_choose_explicit_name_wins_over_event() {
        let mut raw = inputs("tok", "proj");
        raw.database_name = Some("My-Db".to_string());
        let context = CiContext {
            pull_request: Some(PullRequest {
                number: 1,
                head_ref: "main".to_string(),
            }),
            ..Default::default()
        };
        let strategy = ResolutionStrategy::choose(&raw.validate().unwrap(), &context).unwrap();
        assert_eq!(strategy, ResolutionStrategy::ByName("My-Db".to_string()));
    }

    #[test]
    fn test_choose_derives_from_event() {
        let context = CiContext {
            run_number: Some(7),
            ..Default::default()
        };
        let strategy =
            ResolutionStrategy::choose(&inputs("tok", "proj").validate().unwrap(), &context)
                .unwrap();
        assert_eq!(strategy, ResolutionStrategy::ByName("test-7".to_string()));
    }
}
