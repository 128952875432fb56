use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, StoreError};

/// String fields a caller may set on create and change on update.
pub const TEXT_FIELDS: [&str; 5] = [
    "issue_title",
    "issue_text",
    "created_by",
    "assigned_to",
    "status_text",
];

/// A stored issue as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Store-assigned id, rendered as its 24-hex string.
    #[serde(
        rename = "_id",
        serialize_with = "bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub status_text: String,
    pub open: bool,
    pub created_on: DateTime<Utc>,
    /// Absent until the first update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        Ok(bson::from_document(doc)?)
    }
}

/// The document inserted on create. The store assigns `_id`.
#[derive(Debug, Serialize)]
pub struct NewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: DateTime<Utc>,
}

impl NewIssue {
    pub fn from_fields(fields: &Map<String, Value>, now: DateTime<Utc>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            fields
                .get(name)
                .and_then(text_value)
                .filter(|v| !v.is_empty())
                .ok_or(ApiError::Validation("required field(s) missing"))
        };
        let optional = |name: &str| fields.get(name).and_then(text_value).unwrap_or_default();

        Ok(NewIssue {
            issue_title: required("issue_title")?,
            issue_text: required("issue_text")?,
            created_by: required("created_by")?,
            assigned_to: optional("assigned_to"),
            status_text: optional("status_text"),
            open: true,
            created_on: now,
        })
    }

    pub fn to_document(&self) -> Result<Document, StoreError> {
        Ok(bson::to_document(self)?)
    }
}

/// A validated partial update: the raw `_id` plus the fields to `$set`.
#[derive(Debug)]
pub struct IssueUpdate {
    pub id: String,
    pub changes: Document,
}

impl IssueUpdate {
    /// Checks for `_id` first, then that at least one non-blank mutable field
    /// remains. `_id`, `created_on`, `updated_on` and unknown keys never
    /// become changes.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ApiError> {
        let id = fields
            .get("_id")
            .and_then(text_value)
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::Validation("missing _id"))?;

        let fields = strip_blank_fields(fields);
        let mut changes = Document::new();
        for name in TEXT_FIELDS {
            if let Some(value) = fields.get(name).and_then(text_value) {
                changes.insert(name, value);
            }
        }
        if let Some(open) = fields.get("open") {
            changes.insert("open", parse_open(open)?);
        }

        if changes.is_empty() {
            return Err(ApiError::Validation("no update field(s) sent"));
        }
        Ok(IssueUpdate { id, changes })
    }
}

/// Converts a caller-supplied id for update/delete. A malformed id cannot name
/// an existing issue, so it is reported as not found.
pub fn target_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::not_found(raw))
}

/// Pulls `_id` out of a delete payload.
pub fn required_id(fields: &Map<String, Value>) -> Result<String, ApiError> {
    fields
        .get("_id")
        .and_then(text_value)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Validation("missing _id"))
}

/// Returns only the entries whose value is neither null nor an empty string.
pub fn strip_blank_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(_, value)| !matches!(value, Value::Null) && value.as_str() != Some(""))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Builds an exact-match filter from query-string pairs. `_id` becomes an
/// ObjectId and `open` a boolean; everything else compares as a string.
pub fn list_filter(query: &HashMap<String, String>) -> Result<Document, ApiError> {
    let mut filter = Document::new();
    for (key, value) in query {
        if key.starts_with('$') {
            return Err(ApiError::Validation("invalid filter"));
        }
        let value = match key.as_str() {
            "_id" => Bson::ObjectId(
                ObjectId::parse_str(value).map_err(|_| ApiError::Validation("invalid _id"))?,
            ),
            "open" => Bson::Boolean(parse_open(&Value::String(value.clone()))?),
            _ => Bson::String(value.clone()),
        };
        filter.insert(key.clone(), value);
    }
    Ok(filter)
}

fn parse_open(value: &Value) -> Result<bool, ApiError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        _ => Err(ApiError::Validation("invalid open")),
    }
}

// Form bodies only carry strings; JSON callers may send numbers.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
