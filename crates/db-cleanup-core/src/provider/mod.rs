//! Database provider API
//!
//! The cleanup operation talks to the provider through [`DatabaseProvider`]
//! so it can run against the HTTP client in production and an in-memory
//! fake in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

mod client;

pub use client::ProviderClient;

/// A database as returned by the list endpoint. Other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    pub id: String,
    pub name: String,
}

/// Body of `GET /v1/projects/{project_id}/databases`
#[derive(Debug, Deserialize)]
pub(crate) struct ListDatabasesResponse {
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

impl ListDatabasesResponse {
    /// Entries with a string `id` and `name`. Anything else can never match
    /// a name and is skipped.
    pub fn into_records(self) -> Vec<DatabaseRecord> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Skipping malformed database entry: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Operations the cleanup step needs from the provider
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// List every database in a project
    async fn list_databases(&self, project_id: &str) -> Result<Vec<DatabaseRecord>>;

    /// Delete a database by id
    async fn delete_database(&self, database_id: &str) -> Result<()>;
}

/// First record whose name matches exactly
pub fn find_by_name<'a>(records: &'a [DatabaseRecord], name: &str) -> Option<&'a DatabaseRecord> {
    records.iter().find(|db| db.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> DatabaseRecord {
        DatabaseRecord {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let records = vec![
            record("db_1", "other"),
            record("db_2", "pr_42_feature_x"),
            record("db_3", "pr_42_feature_x"),
        ];
        assert_eq!(find_by_name(&records, "pr_42_feature_x").unwrap().id, "db_2");
        assert!(find_by_name(&records, "PR_42_FEATURE_X").is_none());
        assert!(find_by_name(&[], "anything").is_none());
    }

    #[test]
    fn test_list_response_tolerates_missing_data() {
        let parsed: ListDatabasesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.into_records().is_empty());

        let parsed: ListDatabasesResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(parsed.into_records().is_empty());

        let parsed: ListDatabasesResponse = serde_json::from_str(
            r#"{"data": [{"id": "db_1", "name": "a", "region": "us-east-1"}], "pagination": {}}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_records(), vec![record("db_1", "a")]);
    }

    #[test]
    fn test_list_response_skips_malformed_entries() {
        let parsed: ListDatabasesResponse = serde_json::from_str(
            r#"{"data": [
                {"id": "db_x", "name": null},
                {"id": "db_y"},
                {"id": 5, "name": "numeric"},
                "not-an-object",
                {"id": "db_a", "name": "test_7"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_records(), vec![record("db_a", "test_7")]);
    }
}
