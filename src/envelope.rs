//! Server response envelopes `{status, message | data, ...}`, decoded once into
//! `Result<T, ClientError>` so callers never compare status strings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success envelope.
    #[error("{}", .0.as_deref().unwrap_or("request rejected"))]
    Rejected(Option<String>),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Server-provided message for a rejection, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected(msg) => msg.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoKind {
    Native,
    Foreign(String),
}

impl RepoKind {
    pub fn label(&self) -> &str {
        match self {
            RepoKind::Native => "mini-git",
            RepoKind::Foreign(label) => label,
        }
    }
}

impl From<String> for RepoKind {
    fn from(value: String) -> Self {
        if value == "mini-git" {
            RepoKind::Native
        } else {
            RepoKind::Foreign(value)
        }
    }
}

impl Serialize for RepoKind {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RepoKind {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(String::deserialize(d)?.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: RepoKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryStatus {
    #[serde(default)]
    pub clean: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modified_files: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub staged_files: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub untracked_files: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RepositoryStatus {
    pub fn total_changes(&self) -> usize {
        self.modified_files.len() + self.staged_files.len() + self.untracked_files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloneOutcome {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOutcome {
    #[serde(default)]
    pub message: String,
    pub path: String,
}

fn check_status(body: &Value) -> ClientResult<()> {
    let Some(obj) = body.as_object() else {
        return Err(ClientError::Decode("envelope is not an object".to_string()));
    };
    if obj.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(());
    }
    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    Err(ClientError::Rejected(message))
}

/// Decodes the whole envelope body as `T` (clone/create style responses).
pub fn open<T: DeserializeOwned>(body: Value) -> ClientResult<T> {
    check_status(&body)?;
    serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Decodes the envelope's `data` field as `T` (`/api/...` style responses).
pub fn open_data<T: DeserializeOwned>(mut body: Value) -> ClientResult<T> {
    check_status(&body)?;
    let data = body
        .as_object_mut()
        .and_then(|o| o.remove("data"))
        .ok_or_else(|| ClientError::Decode("missing data".to_string()))?;
    serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
}
