//! Documents and response shapes of the Q&A knowledge base

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Design document and view listing every content document
pub const CONTENT_DESIGN: &str = "answers";
pub const CONTENT_VIEW: &str = "list";

/// Fixed id of the application settings document
pub const APP_SETTINGS_ID: &str = "app_settings";

/// Q&A record: the id is the classification label it answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(rename = "_id")]
    pub id: String,

    /// Revision token, only present when read from the store
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Canned response
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    /// Example questions used as training data
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<String>,

    /// Structured options rendered by the chat client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<Value>,
}

/// Drafts saved by the editor may carry `null` for unfinished fields
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Singleton application settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    #[serde(default)]
    pub name: String,
}

/// Display-ready answer for one predicted label
///
/// Serialized with `class_name` for the label, matching the classifier's
/// own field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "class_name")]
    pub label: String,
    pub message: String,
    pub confidence: f64,
}
