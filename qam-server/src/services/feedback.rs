//! Feedback log
//!
//! Chat clients record every exchange (question, predicted label, answer,
//! like/comment) in a separate database. The service only creates that
//! database with its listing view, lists records and deletes them.

use crate::clients::{DocumentStore, ServiceResult, ViewRow, WriteResult};
use serde_json::{json, Value};
use tracing::{debug, info};

pub const FEEDBACK_DESIGN: &str = "objects";
pub const FEEDBACK_VIEW: &str = "list";

/// Map function of the listing view, keyed by record timestamp
const LIST_MAP: &str = "function (doc) { emit(doc.datetime, {\
_id: doc._id, _rev: doc._rev, datetime: doc.datetime, question: doc.question, \
class_name: doc.class_name, answer: doc.answer, final_answer: doc.final_answer, \
like: doc.like, comment: doc.comment, confidence: doc.confidence}); }";

/// Design document carrying the listing view
pub fn design_document() -> Value {
    json!({
        "_id": format!("_design/{}", FEEDBACK_DESIGN),
        "language": "javascript",
        "views": {
            FEEDBACK_VIEW: { "map": LIST_MAP }
        }
    })
}

/// Create the feedback database and its design document if missing
///
/// "Already exists" answers (412 for the database, 409 for the design
/// document) count as success.
pub async fn ensure_feedback_log(store: &dyn DocumentStore) -> ServiceResult<()> {
    match store.create_database().await {
        Ok(()) => info!("Created feedback database"),
        Err(e) if e.status() == Some(412) => debug!("Feedback database already exists"),
        Err(e) => return Err(e),
    }

    match store.insert(design_document()).await {
        Ok(_) => info!("Created feedback design document"),
        Err(e) if e.status() == Some(409) => debug!("Feedback design document already exists"),
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Feedback records, oldest first
pub async fn list_feedback(store: &dyn DocumentStore) -> ServiceResult<Vec<ViewRow>> {
    let view = store.view(FEEDBACK_DESIGN, FEEDBACK_VIEW).await?;
    Ok(view.rows)
}

pub async fn delete_feedback(
    store: &dyn DocumentStore,
    id: &str,
    rev: &str,
) -> ServiceResult<WriteResult> {
    let result = store.destroy(id, rev).await?;
    info!(id, "Deleted feedback record");
    Ok(result)
}
