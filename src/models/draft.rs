//! Draft data models and API request/response types.
//!
//! This module defines:
//! - `Draft`: Database entity representing a saved invoice draft
//! - `DraftWrite`: What a save request asks for (save params, rename, or both)
//! - `DraftDetails` / `DraftSummary`: Response bodies returned to clients

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Longest user or draft name accepted (matches the `VARCHAR(255)` columns).
pub const MAX_NAME_LEN: usize = 255;

/// Represents a draft record from the database.
///
/// # Database Table
///
/// Maps to the `user_drafts` table, keyed by `(user_name, name)`. For a given
/// user each name identifies at most one row.
///
/// # Params
///
/// `params` is the invoice form state exactly as the client sent it. The store
/// never inspects, validates or strips it; a save replaces it wholesale.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Draft {
    /// Owner of the draft (typically an email address)
    pub user_name: String,

    /// User-chosen draft label, unique per user
    pub name: String,

    /// Opaque JSON document
    pub params: Value,

    /// Refreshed on every save and rename
    pub updated_at: DateTime<Utc>,
}

/// Response body for `GET /api/users/{userName}/drafts/{draftName}`.
///
/// # JSON Example
///
/// ```json
/// {
///   "userName": "testuser",
///   "name": "test-draft",
///   "params": { "invoiceNumber": "123", "date": "2025-09-10" }
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDetails {
    pub user_name: String,
    pub name: String,
    pub params: Value,
}

impl From<Draft> for DraftDetails {
    fn from(draft: Draft) -> Self {
        Self {
            user_name: draft.user_name,
            name: draft.name,
            params: draft.params,
        }
    }
}

/// One entry of `GET /api/users/{userName}/drafts`.
///
/// The list returns full documents so the editor can open any draft without
/// a second round trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub user_name: String,
    pub name: String,
    pub params: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<Draft> for DraftSummary {
    fn from(draft: Draft) -> Self {
        Self {
            user_name: draft.user_name,
            name: draft.name,
            params: draft.params,
            updated_at: draft.updated_at,
        }
    }
}

/// What a `PUT`/`POST` on a draft asks the store to do.
///
/// # Body Forms
///
/// - `{"params": {...}}` saves the inner object
/// - `{"newName": "q3"}` renames the draft
/// - `{"newName": "q3", "params": {...}}` renames, then saves under the new name
/// - any other JSON object is itself the params document
#[derive(Debug, Clone, PartialEq)]
pub enum DraftWrite {
    Save(Value),
    Rename {
        new_name: String,
        params: Option<Value>,
    },
}

impl DraftWrite {
    /// Classify a request body.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the body is not a JSON object
    /// - `InvalidRequest` if `newName` is empty, too long or contains NUL
    /// - `InvalidRequest` if any string or key in the params contains NUL
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let Value::Object(mut object) = body else {
            return Err(AppError::InvalidRequest(
                "Draft body must be a JSON object".to_string(),
            ));
        };

        // PostgreSQL text and jsonb cannot hold U+0000
        if contains_nul(&object) {
            return Err(AppError::InvalidRequest(
                "Draft body must not contain U+0000 characters".to_string(),
            ));
        }

        if !is_envelope(&object) {
            return Ok(DraftWrite::Save(Value::Object(object)));
        }

        let params = object.remove("params");
        match object.remove("newName") {
            Some(Value::String(new_name)) => {
                validate_name("newName", &new_name)?;
                Ok(DraftWrite::Rename { new_name, params })
            }
            // is_envelope guarantees at least one of the two keys
            _ => Ok(DraftWrite::Save(params.unwrap_or_else(|| Value::Object(Map::new())))),
        }
    }
}

/// An envelope has only `params` and/or `newName`, with the right types.
///
/// A params document that happens to carry a `params` key next to other
/// fields is therefore saved verbatim. One whose only key is an object
/// `params` is indistinguishable from an envelope and gets unwrapped.
fn is_envelope(object: &Map<String, Value>) -> bool {
    if object.is_empty() {
        return false;
    }

    object.iter().all(|(key, value)| match key.as_str() {
        "params" => value.is_object(),
        "newName" => value.is_string(),
        _ => false,
    })
}

fn contains_nul(object: &Map<String, Value>) -> bool {
    object
        .iter()
        .any(|(key, value)| key.contains('\0') || value_contains_nul(value))
}

fn value_contains_nul(value: &Value) -> bool {
    match value {
        Value::String(text) => text.contains('\0'),
        Value::Array(items) => items.iter().any(value_contains_nul),
        Value::Object(object) => contains_nul(object),
        _ => false,
    }
}

/// Reject empty, whitespace-only, oversized and NUL-containing names.
pub fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "{field} must not be empty"
        )));
    }

    if value.contains('\0') {
        return Err(AppError::InvalidRequest(format!(
            "{field} must not contain U+0000"
        )));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidRequest(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_object_is_saved_verbatim() {
        let body = json!({ "invoiceNumber": "123", "items": [{ "rate": 50 }] });
        assert_eq!(
            DraftWrite::from_body(body.clone()).unwrap(),
            DraftWrite::Save(body)
        );
    }

    #[test]
    fn params_envelope_is_unwrapped() {
        let body = json!({ "params": { "currency": "EUR" } });
        assert_eq!(
            DraftWrite::from_body(body).unwrap(),
            DraftWrite::Save(json!({ "currency": "EUR" }))
        );
    }

    #[test]
    fn new_name_requests_a_rename() {
        assert_eq!(
            DraftWrite::from_body(json!({ "newName": "q3" })).unwrap(),
            DraftWrite::Rename {
                new_name: "q3".to_string(),
                params: None
            }
        );

        assert_eq!(
            DraftWrite::from_body(json!({ "newName": "q3", "params": { "a": 1 } })).unwrap(),
            DraftWrite::Rename {
                new_name: "q3".to_string(),
                params: Some(json!({ "a": 1 }))
            }
        );
    }

    #[test]
    fn params_key_beside_other_fields_is_part_of_the_document() {
        let body = json!({ "params": { "a": 1 }, "notes": "keep me" });
        assert_eq!(
            DraftWrite::from_body(body.clone()).unwrap(),
            DraftWrite::Save(body)
        );

        let body = json!({ "params": "not an object" });
        assert_eq!(
            DraftWrite::from_body(body.clone()).unwrap(),
            DraftWrite::Save(body)
        );
    }

    #[test]
    fn empty_object_is_a_valid_document() {
        assert_eq!(
            DraftWrite::from_body(json!({})).unwrap(),
            DraftWrite::Save(json!({}))
        );
    }

    #[test]
    fn non_objects_are_rejected() {
        for body in [json!([1, 2]), json!("draft"), json!(42), Value::Null] {
            assert!(matches!(
                DraftWrite::from_body(body),
                Err(AppError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn blank_new_name_is_rejected() {
        assert!(matches!(
            DraftWrite::from_body(json!({ "newName": "   " })),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(validate_name("draftName", &"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name("draftName", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn names_with_nul_are_rejected() {
        assert!(matches!(
            validate_name("userName", "a\0b"),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn nul_anywhere_in_params_is_rejected() {
        for body in [
            json!({ "notes": "line\0break" }),
            json!({ "items": [{ "description": "a\0" }] }),
            json!({ "params": { "k\0": 1 } }),
            json!({ "newName": "q3\0" }),
        ] {
            assert!(matches!(
                DraftWrite::from_body(body),
                Err(AppError::InvalidRequest(_))
            ));
        }
    }
}
