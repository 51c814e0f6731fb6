//! Bulk replace of the content collection
//!
//! Replaces every content document and the settings document with an
//! uploaded set, typically an edited `/export-content` dump.
//!
//! 1. List current content documents and mark each for deletion
//! 2. Mark the settings document for deletion (skipped when missing)
//! 3. Submit the deletion batch
//! 4. Submit the replacement batch
//!
//! The document store has no multi-document transactions, so this is not
//! atomic. The insert is only attempted once every deletion has been
//! accepted; a failed listing or a rejected deletion stops the replace
//! before anything new is written. A rejected insert is reported as a
//! failure too, since the collection is then incomplete.

use crate::clients::{DocumentStore, ServiceError, WriteResult};
use crate::models::{APP_SETTINGS_ID, CONTENT_DESIGN, CONTENT_VIEW};
use qam_common::Error;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error as ThisError;
use tracing::{info, warn};

/// Bulk replace failure
#[derive(Debug, ThisError)]
pub enum ReloadError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Some deletions were rejected; nothing was inserted
    #[error("{} document(s) could not be deleted, replacement not inserted", .0.len())]
    DeleteRejected(Vec<WriteResult>),

    /// Old content is gone but some replacement documents were rejected
    #[error("{} replacement document(s) could not be inserted", .0.len())]
    InsertRejected(Vec<WriteResult>),
}

/// Outcome of a successful replace
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceReport {
    /// Documents removed, settings document included
    pub deleted: usize,
    /// Per-document results of the insert batch
    pub inserted: Vec<WriteResult>,
}

/// Validate an uploaded `{"docs": [...]}` payload
///
/// Every document must be an object with a non-empty string `_id`.
/// Revision tokens are dropped so re-imported exports insert as new documents.
pub fn parse_import(payload: Value) -> qam_common::Result<Vec<Value>> {
    let docs = match payload {
        Value::Object(mut object) => object.remove("docs"),
        _ => None,
    };
    let Some(Value::Array(docs)) = docs else {
        return Err(Error::InvalidInput(
            "expected an object with a \"docs\" array".to_string(),
        ));
    };

    docs.into_iter()
        .enumerate()
        .map(|(index, doc)| match doc {
            Value::Object(mut object) => {
                match object.get("_id") {
                    Some(Value::String(id)) if !id.trim().is_empty() => {}
                    _ => {
                        return Err(Error::InvalidInput(format!(
                            "docs[{}] has no string \"_id\"",
                            index
                        )))
                    }
                }
                object.remove("_rev");
                Ok(Value::Object(object))
            }
            _ => Err(Error::InvalidInput(format!("docs[{}] is not an object", index))),
        })
        .collect()
}

/// Replace the whole collection with `docs`
pub async fn replace_all(
    store: &dyn DocumentStore,
    docs: Vec<Value>,
) -> Result<ReplaceReport, ReloadError> {
    let view = store.view(CONTENT_DESIGN, CONTENT_VIEW).await?;

    let mut deletions: Vec<Value> = view
        .rows
        .iter()
        .filter_map(|row| {
            let id = row.value.get("_id").and_then(Value::as_str).or(row.id.as_deref())?;
            let rev = row.value.get("_rev").and_then(Value::as_str)?;
            Some(json!({ "_id": id, "_rev": rev, "_deleted": true }))
        })
        .collect();

    match store.get(APP_SETTINGS_ID).await {
        Ok(settings) => {
            if let Some(rev) = settings.get("_rev").and_then(Value::as_str) {
                deletions.insert(0, json!({ "_id": APP_SETTINGS_ID, "_rev": rev, "_deleted": true }));
            }
        }
        Err(e) if e.is_not_found() => {
            info!("No application settings document to delete");
        }
        Err(e) => return Err(e.into()),
    }

    let deleted = deletions.len();
    if !deletions.is_empty() {
        let results = store.bulk(deletions).await?;
        let rejected: Vec<WriteResult> = results.into_iter().filter(WriteResult::is_error).collect();
        if !rejected.is_empty() {
            warn!(rejected = rejected.len(), "Deletion batch partially rejected, aborting replace");
            return Err(ReloadError::DeleteRejected(rejected));
        }
    }
    info!(deleted, "Deleted existing content");

    let inserted = store.bulk(docs).await?;
    let rejected: Vec<WriteResult> = inserted.iter().filter(|r| r.is_error()).cloned().collect();
    if !rejected.is_empty() {
        warn!(
            rejected = rejected.len(),
            accepted = inserted.len() - rejected.len(),
            "Replacement batch partially rejected"
        );
        return Err(ReloadError::InsertRejected(rejected));
    }
    info!(inserted = inserted.len(), "Inserted replacement content");

    Ok(ReplaceReport { deleted, inserted })
}
