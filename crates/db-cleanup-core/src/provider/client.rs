//! HTTP implementation of [`DatabaseProvider`]

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};

use super::{DatabaseProvider, DatabaseRecord, ListDatabasesResponse};
use crate::config::{ProviderConfig, USER_AGENT};
use crate::error::{CleanupError, Result};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Bearer-authenticated client for the provider REST API
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Build a client for the configured API using the given service token
    pub fn new(config: &ProviderConfig, service_token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", service_token)).map_err(|_| {
            CleanupError::Configuration(
                "service_token contains characters not allowed in an HTTP header".to_string(),
            )
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                CleanupError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("").to_string()
}

/// Whether an `error` field flags a failure. Null, false, "" and 0 do not.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn message_field(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Detail text for a non-success delete response
fn failure_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(message) = message_field(&json)
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl DatabaseProvider for ProviderClient {
    async fn list_databases(&self, project_id: &str) -> Result<Vec<DatabaseRecord>> {
        let url = self.url(&format!(
            "/v1/projects/{}/databases",
            urlencoding::encode(project_id)
        ));
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(CleanupError::NetworkTransport)?;

        let status = response.status();
        trace!("List response status: {}", status);
        if !status.is_success() {
            return Err(CleanupError::Network {
                status: status.as_u16(),
                reason: reason(status),
            });
        }

        let body = response
            .text()
            .await
            .map_err(CleanupError::NetworkTransport)?;
        let parsed: ListDatabasesResponse = serde_json::from_str(&body)
            .map_err(|e| CleanupError::InvalidResponse(e.to_string()))?;

        let records = parsed.into_records();
        debug!("Provider returned {} databases", records.len());
        Ok(records)
    }

    async fn delete_database(&self, database_id: &str) -> Result<()> {
        let url = self.url(&format!(
            "/v1/databases/{}",
            urlencoding::encode(database_id)
        ));
        debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(CleanupError::DeletionTransport)?;

        let status = response.status();
        trace!("Delete response status: {}", status);
        let body = response
            .text()
            .await
            .map_err(CleanupError::DeletionTransport)?;

        if !status.is_success() {
            return Err(CleanupError::Deletion {
                status: status.as_u16(),
                reason: reason(status),
                detail: failure_detail(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(());
        }

        let json: Value = serde_json::from_str(&body).map_err(|_| CleanupError::Deletion {
            status: status.as_u16(),
            reason: reason(status),
            detail: "invalid JSON response".to_string(),
        })?;

        if is_truthy(json.get("error")) {
            return Err(CleanupError::Deletion {
                status: status.as_u16(),
                reason: reason(status),
                detail: message_field(&json).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!("NOT_FOUND"))));
        assert!(is_truthy(Some(&json!({"code": 1}))));
        assert!(is_truthy(Some(&json!([]))));
    }

    #[test]
    fn test_failure_detail() {
        assert_eq!(
            failure_detail(r#"{"error": true, "message": "Database is locked"}"#),
            "Database is locked"
        );
        assert_eq!(failure_detail("upstream timeout\n"), "upstream timeout");
        assert_eq!(failure_detail(""), UNKNOWN_ERROR);
        assert_eq!(
            failure_detail(r#"{"error": "x"}"#),
            r#"{"error": "x"}"#
        );
    }

    #[test]
    fn test_new_rejects_invalid_token() {
        let err = ProviderClient::new(&ProviderConfig::default(), "bad\ntoken").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_debug_hides_token() {
        let client = ProviderClient::new(&ProviderConfig::default(), "secret-token").unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("https://api.prisma.io"));
    }
}
