//! CI context passed into a cleanup run
//!
//! The operation never reads the environment itself. Everything it needs
//! about the triggering event is captured once in a [`CiContext`], either
//! from the GitHub Actions environment via [`CiContext::from_env`] or built
//! by hand in tests.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{CleanupError, Result};

const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";
const RUN_NUMBER_VAR: &str = "GITHUB_RUN_NUMBER";
const INPUT_PREFIX: &str = "INPUT_";

/// Pull request that triggered the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    /// Head branch name (`pull_request.head.ref`)
    pub head_ref: String,
}

/// Key/value store of step inputs.
///
/// Keys follow the Actions convention: `service_token` and
/// `INPUT_SERVICE_TOKEN` address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputStore {
    values: BTreeMap<String, String>,
}

impl InputStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.replace(' ', "_").to_uppercase()
    }

    /// Set an input, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(Self::key(name), value.into());
    }

    /// Read an input. Whitespace is trimmed and empty values read as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&Self::key(name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Collect `INPUT_*` pairs from an environment iterator
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut store = Self::new();
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(INPUT_PREFIX) {
                store.set(name, value);
            }
        }
        store
    }
}

/// Read-only view of the triggering CI event
#[derive(Debug, Clone, Default)]
pub struct CiContext {
    pub pull_request: Option<PullRequest>,
    pub run_number: Option<u64>,
    pub inputs: InputStore,
}

#[derive(Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: HeadPayload,
}

#[derive(Deserialize)]
struct HeadPayload {
    #[serde(rename = "ref")]
    git_ref: String,
}

impl CiContext {
    /// Capture the context from the GitHub Actions environment
    pub fn from_env() -> Result<Self> {
        let event_path = std::env::var(EVENT_PATH_VAR).ok();
        let run_number = std::env::var(RUN_NUMBER_VAR).ok();

        let pull_request = match event_path.as_deref() {
            Some(path) => read_pull_request(Path::new(path))?,
            None => {
                debug!("{} not set, assuming no pull request", EVENT_PATH_VAR);
                None
            }
        };

        Ok(Self {
            pull_request,
            run_number: parse_run_number(run_number.as_deref()),
            inputs: InputStore::from_env_vars(std::env::vars_os().filter_map(|(k, v)| {
                Some((k.into_string().ok()?, v.into_string().ok()?))
            })),
        })
    }
}

fn parse_run_number(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("Ignoring unparsable {}: {:?}", RUN_NUMBER_VAR, raw);
            None
        }
    }
}

/// Extract the pull request from an event payload file.
///
/// A missing file means there is no payload to read. A payload that exists
/// but cannot be parsed is an error.
pub fn read_pull_request(path: &Path) -> Result<Option<PullRequest>> {
    if !path.exists() {
        warn!("{} {} does not exist", EVENT_PATH_VAR, path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        CleanupError::Configuration(format!(
            "Failed to read event payload {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_pull_request(&content)
}

fn parse_pull_request(content: &str) -> Result<Option<PullRequest>> {
    let payload: EventPayload = serde_json::from_str(content)
        .map_err(|e| CleanupError::Configuration(format!("Invalid event payload: {}", e)))?;

    Ok(payload.pull_request.map(|pr| PullRequest {
        number: pr.number,
        head_ref: pr.head.git_ref,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_input_store_normalizes_names() {
        let mut store = InputStore::new();
        store.set("service_token", "secret");
        assert_eq!(store.get("SERVICE_TOKEN"), Some("secret"));
        assert_eq!(store.get("service_token"), Some("secret"));

        store.set("database name", "x");
        assert_eq!(store.get("DATABASE_NAME"), Some("x"));
    }

    #[test]
    fn test_input_store_trims_and_treats_empty_as_absent() {
        let mut store = InputStore::new();
        store.set("project_id", "  proj_1 \n");
        store.set("database_name", "   ");
        assert_eq!(store.get("project_id"), Some("proj_1"));
        assert_eq!(store.get("database_name"), None);
        assert_eq!(store.get("database_id"), None);
    }

    #[test]
    fn test_input_store_from_env_vars() {
        let vars = vec![
            ("INPUT_SERVICE_TOKEN".to_string(), "tok".to_string()),
            ("INPUT_PROJECT_ID".to_string(), "proj".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let store = InputStore::from_env_vars(vars);
        assert_eq!(store.get("service_token"), Some("tok"));
        assert_eq!(store.get("project_id"), Some("proj"));
        assert_eq!(store.get("home"), None);
    }

    #[test]
    fn test_parse_pull_request_payload() {
        let payload = r#"{
            "action": "closed",
            "pull_request": {
                "number": 42,
                "head": { "ref": "feature/x", "sha": "abc" }
            }
        }"#;
        let pr = parse_pull_request(payload).unwrap().unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.head_ref, "feature/x");
    }

    #[test]
    fn test_parse_push_payload_has_no_pull_request() {
        let payload = r#"{ "ref": "refs/heads/main", "commits": [] }"#;
        assert!(parse_pull_request(payload).unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_payload() {
        let err = parse_pull_request("{not json").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_read_pull_request_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pull_request": {{"number": 3, "head": {{"ref": "fix/typo"}}}}}}"#
        )
        .unwrap();

        let pr = read_pull_request(file.path()).unwrap().unwrap();
        assert_eq!(
            pr,
            PullRequest {
                number: 3,
                head_ref: "fix/typo".to_string()
            }
        );
    }

    #[test]
    fn test_read_pull_request_missing_file() {
        let path = Path::new("/tmp/db-cleanup-test-nonexistent/event.json");
        assert!(read_pull_request(path).unwrap().is_none());
    }

    #[test]
    fn test_parse_run_number() {
        assert_eq!(parse_run_number(Some("7")), Some(7));
        assert_eq!(parse_run_number(Some(" 12 ")), Some(12));
        assert_eq!(parse_run_number(Some("abc")), None);
        assert_eq!(parse_run_number(None), None);
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pull_request": {{"number": 8, "head": {{"ref": "dev"}}}}}}"#
        )
        .unwrap();

        unsafe {
            std::env::set_var(EVENT_PATH_VAR, file.path());
            std::env::set_var(RUN_NUMBER_VAR, "21");
            std::env::set_var("INPUT_PROJECT_ID", "proj_env");
        }

        let context = CiContext::from_env().unwrap();
        assert_eq!(context.pull_request.unwrap().number, 8);
        assert_eq!(context.run_number, Some(21));
        assert_eq!(context.inputs.get("project_id"), Some("proj_env"));

        unsafe {
            std::env::remove_var(EVENT_PATH_VAR);
            std::env::remove_var(RUN_NUMBER_VAR);
            std::env::remove_var("INPUT_PROJECT_ID");
        }
    }
}
