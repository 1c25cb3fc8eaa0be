//! ClickUp task source client

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const CLICKUP_API_URL: &str = "https://api.clickup.com/api/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ClickUp rejected the API token (HTTP {status}); check CLICKUP_API_KEY")]
    Auth { status: StatusCode },

    #[error("ClickUp returned HTTP {status} for list {list_id}")]
    Http { status: StatusCode, list_id: String },

    #[error("ClickUp request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed ClickUp response for list {list_id}: {reason}")]
    Malformed { list_id: String, reason: String },
}

/// A task record from the list-tasks endpoint.
///
/// Fields the API may omit fall back to the same placeholders the digest
/// renders ("No title", "Unknown"); `due_date` arrives as a string-encoded
/// epoch-millisecond value and is validated at parse time.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub url: String,

    /// Due timestamp in epoch milliseconds, if the task has one.
    #[serde(default, deserialize_with = "de_epoch_millis")]
    pub due_date: Option<i64>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    #[serde(default = "default_status")]
    pub status: String,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self {
            status: default_status(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Assignee {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl Assignee {
    /// Display name: first non-empty of name, username, email.
    pub fn display_name(&self) -> &str {
        [&self.name, &self.username, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("Unassigned")
    }
}

fn default_name() -> String {
    "No title".to_string()
}

fn default_status() -> String {
    "Unknown".to_string()
}

/// ClickUp sends `due_date` as a string-encoded integer; accept a bare
/// number too. A non-numeric string is a malformed record, not a skip.
fn de_epoch_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(ms)) => Ok(Some(ms)),
        Some(Raw::Text(s)) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("non-numeric due_date {:?}", s))),
    }
}

// The `tasks` field is required: a response without it is malformed, which
// keeps "zero tasks" distinct from "could not determine tasks".
#[derive(Debug, Deserialize)]
struct TasksResponse {
    tasks: Vec<Task>,
}

/// Client for the ClickUp list-tasks endpoint.
pub struct TaskClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TaskClient {
    pub fn new(token: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("duebot/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: CLICKUP_API_URL.to_string(),
            token: token.into(),
        })
    }

    /// Point the client at a different API root. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the raw task records for one list.
    pub async fn fetch_tasks(&self, list_id: &str) -> Result<Vec<Task>, FetchError> {
        let url = format!("{}/list/{}/task", self.base_url, list_id);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, &self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Auth { status });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                list_id: list_id.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: TasksResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
                list_id: list_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!(list_id, count = parsed.tasks.len(), "fetched tasks");
        Ok(parsed.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_task() {
        let json = r#"{
            "tasks": [{
                "name": "Fix bug",
                "url": "https://x/1",
                "due_date": "1770451200000",
                "status": {"status": "Open"},
                "assignees": [{"name": "Alice", "username": "alice", "email": "a@x.io"}]
            }]
        }"#;

        let parsed: TasksResponse = serde_json::from_str(json).unwrap();
        let task = &parsed.tasks[0];
        assert_eq!(task.name, "Fix bug");
        assert_eq!(task.url, "https://x/1");
        assert_eq!(task.due_date, Some(1770451200000));
        assert_eq!(task.status.status, "Open");
        assert_eq!(task.assignees[0].display_name(), "Alice");
    }

    #[test]
    fn test_parse_defaults_for_missing_fields() {
        let json = r#"{"tasks": [{}]}"#;

        let parsed: TasksResponse = serde_json::from_str(json).unwrap();
        let task = &parsed.tasks[0];
        assert_eq!(task.name, "No title");
        assert_eq!(task.url, "");
        assert_eq!(task.due_date, None);
        assert_eq!(task.status.status, "Unknown");
        assert!(task.assignees.is_empty());
    }

    #[test]
    fn test_parse_null_due_date() {
        let json = r#"{"tasks": [{"due_date": null}]}"#;

        let parsed: TasksResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tasks[0].due_date, None);
    }

    #[test]
    fn test_parse_numeric_due_date() {
        let json = r#"{"tasks": [{"due_date": 1770451200000}]}"#;

        let parsed: TasksResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tasks[0].due_date, Some(1770451200000));
    }

    #[test]
    fn test_non_numeric_due_date_is_an_error() {
        let json = r#"{"tasks": [{"due_date": "tomorrow"}]}"#;

        let result = serde_json::from_str::<TasksResponse>(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("due_date"));
    }

    #[test]
    fn test_missing_tasks_field_is_an_error() {
        let result = serde_json::from_str::<TasksResponse>(r#"{"err": "oops"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_name_prefers_name_then_username_then_email() {
        let assignee = Assignee {
            name: None,
            username: Some("alice".to_string()),
            email: Some("a@x.io".to_string()),
        };
        assert_eq!(assignee.display_name(), "alice");

        let assignee = Assignee {
            name: None,
            username: None,
            email: Some("a@x.io".to_string()),
        };
        assert_eq!(assignee.display_name(), "a@x.io");
    }

    #[test]
    fn test_display_name_skips_empty_strings() {
        let assignee = Assignee {
            name: Some(String::new()),
            username: Some("alice".to_string()),
            email: None,
        };
        assert_eq!(assignee.display_name(), "alice");
    }

    #[test]
    fn test_display_name_falls_back_to_unassigned() {
        assert_eq!(Assignee::default().display_name(), "Unassigned");
    }
}
