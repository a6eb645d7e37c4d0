//! Offline action types.
//!
//! An action pairs an [`ActionKind`] (which carries its payload, when the
//! kind has one) with the endpoint it targets and the bookkeeping the
//! replay loop needs.

use chrono::{DateTime, SubsecRound, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SakaniError;

const ID_SUFFIX_LEN: usize = 9;

/// The mutation an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    /// Create a resource.
    Create,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,
}

impl ActionType {
    /// Get the display name for this action type.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// HTTP method used to deliver this action.
    #[must_use]
    pub const fn method(&self) -> Method {
        match self {
            Self::Create => Method::Post,
            Self::Update => Method::Put,
            Self::Delete => Method::Delete,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// HTTP methods the queue delivers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// JSON object sent as the request body of a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Wrap an existing JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a payload from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, SakaniError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(SakaniError::InvalidAction(format!(
                "payload must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or not an object.
    pub fn parse(text: &str) -> Result<Self, SakaniError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SakaniError::InvalidAction(format!("payload is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// What an action does, together with the payload that kind requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Create(Payload),
    Update(Payload),
    Delete,
}

impl ActionKind {
    /// Build a kind from its type and an optional payload.
    ///
    /// A payload given with `DELETE` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if `CREATE` or `UPDATE` has no payload.
    pub fn from_parts(
        action_type: ActionType,
        payload: Option<Payload>,
    ) -> Result<Self, SakaniError> {
        match (action_type, payload) {
            (ActionType::Create, Some(payload)) => Ok(Self::Create(payload)),
            (ActionType::Update, Some(payload)) => Ok(Self::Update(payload)),
            (ActionType::Delete, _) => Ok(Self::Delete),
            (action_type, None) => Err(SakaniError::InvalidAction(format!(
                "{action_type} requires a data payload"
            ))),
        }
    }

    /// The type of this kind.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Create(_) => ActionType::Create,
            Self::Update(_) => ActionType::Update,
            Self::Delete => ActionType::Delete,
        }
    }

    /// The payload, for kinds that carry one.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Create(payload) | Self::Update(payload) => Some(payload),
            Self::Delete => None,
        }
    }
}

/// Non-empty resource locator an action is delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Validate and wrap an endpoint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if the endpoint is empty or whitespace.
    pub fn parse(endpoint: impl Into<String>) -> Result<Self, SakaniError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(SakaniError::InvalidAction(
                "endpoint must not be empty".to_string(),
            ));
        }
        Ok(Self(endpoint))
    }

    /// The endpoint as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique action identifier: `<epoch millis>-<random suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Generate an identifier for an action created at `at`.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("{}-{suffix}", at.timestamp_millis()))
    }

    /// The identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mutation a caller wants performed, before it is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionIntent {
    pub kind: ActionKind,
    pub endpoint: Endpoint,
}

impl ActionIntent {
    /// Intent to create a resource at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if the endpoint is empty.
    pub fn create(endpoint: impl Into<String>, payload: Payload) -> Result<Self, SakaniError> {
        Ok(Self {
            kind: ActionKind::Create(payload),
            endpoint: Endpoint::parse(endpoint)?,
        })
    }

    /// Intent to update the resource at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if the endpoint is empty.
    pub fn update(endpoint: impl Into<String>, payload: Payload) -> Result<Self, SakaniError> {
        Ok(Self {
            kind: ActionKind::Update(payload),
            endpoint: Endpoint::parse(endpoint)?,
        })
    }

    /// Intent to delete the resource at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if the endpoint is empty.
    pub fn delete(endpoint: impl Into<String>) -> Result<Self, SakaniError> {
        Ok(Self {
            kind: ActionKind::Delete,
            endpoint: Endpoint::parse(endpoint)?,
        })
    }
}

/// A queued action.
///
/// Serializes to the flat snapshot record
/// `{"id","type","endpoint","data","timestamp","retryCount"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredAction", into = "StoredAction")]
pub struct OfflineAction {
    pub id: ActionId,
    pub kind: ActionKind,
    pub endpoint: Endpoint,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
}

impl OfflineAction {
    /// Create a fresh action from an intent.
    ///
    /// The timestamp is truncated to milliseconds, the precision it is
    /// stored with.
    #[must_use]
    pub fn from_intent(intent: ActionIntent) -> Self {
        let timestamp = Utc::now().trunc_subsecs(3);
        Self {
            id: ActionId::generate(timestamp),
            kind: intent.kind,
            endpoint: intent.endpoint,
            timestamp,
            retry_count: 0,
        }
    }

    /// The action's type.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }

    /// Whether another failure is allowed to be recorded.
    #[must_use]
    pub const fn can_retry(&self, max_retries: u32) -> bool {
        self.retry_count < max_retries
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAction {
    id: ActionId,
    #[serde(rename = "type")]
    action_type: ActionType,
    endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Payload>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    retry_count: u32,
}

impl TryFrom<StoredAction> for OfflineAction {
    type Error = SakaniError;

    fn try_from(stored: StoredAction) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: ActionKind::from_parts(stored.action_type, stored.data)?,
            endpoint: Endpoint::parse(stored.endpoint)?,
            id: stored.id,
            timestamp: stored.timestamp,
            retry_count: stored.retry_count,
        })
    }
}

impl From<OfflineAction> for StoredAction {
    fn from(action: OfflineAction) -> Self {
        let action_type = action.action_type();
        let data = match action.kind {
            ActionKind::Create(payload) | ActionKind::Update(payload) => Some(payload),
            ActionKind::Delete => None,
        };
        Self {
            id: action.id,
            action_type,
            endpoint: action.endpoint.0,
            data,
            timestamp: action.timestamp,
            retry_count: action.retry_count,
        }
    }
}
