//! Content export
//!
//! Three exports of the content collection, all in the order the store's
//! `answers/list` view returns documents:
//! - full JSON dump (settings document first), re-importable by
//!   [`crate::services::reload`]
//! - classifier training CSV, one `"question","label"` line per question
//! - speech corpus text, a 質問/回答 block per document

use crate::clients::{DocumentStore, ServiceResult};
use crate::models::{AppSettings, ContentDocument, APP_SETTINGS_ID, CONTENT_DESIGN, CONTENT_VIEW};
use crate::services::decode_document;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Header line preceding a document's questions in the corpus
const CORPUS_QUESTIONS: &str = "質問";
/// Header line preceding a document's answer in the corpus
const CORPUS_ANSWER: &str = "回答";

/// Every content document as stored, minus its revision token
pub async fn content_values(store: &dyn DocumentStore) -> ServiceResult<Vec<Value>> {
    let view = store.view(CONTENT_DESIGN, CONTENT_VIEW).await?;
    debug!(rows = view.rows.len(), "Listed content documents");

    Ok(view
        .rows
        .into_iter()
        .map(|row| {
            let mut value = row.value;
            if let Some(object) = value.as_object_mut() {
                object.remove("_rev");
            }
            value
        })
        .collect())
}

/// Every content document, typed
pub async fn list_content(store: &dyn DocumentStore) -> ServiceResult<Vec<ContentDocument>> {
    content_values(store)
        .await?
        .into_iter()
        .map(decode_document)
        .collect()
}

/// Settings document (as `{_id, name}`) followed by every content document
///
/// A missing settings document is skipped.
pub async fn list_all(store: &dyn DocumentStore) -> ServiceResult<Vec<Value>> {
    let mut docs = content_values(store).await?;

    match store.get(APP_SETTINGS_ID).await {
        Ok(value) => {
            let settings: AppSettings = decode_document(value)?;
            docs.insert(0, json!({ "_id": settings.id, "name": settings.name }));
        }
        Err(e) if e.is_not_found() => {
            info!("No application settings document, exporting content only");
        }
        Err(e) => return Err(e),
    }

    Ok(docs)
}

/// Classifier training CSV
///
/// No header row; fields are quoted but embedded quotes are not escaped.
pub fn to_csv(docs: &[ContentDocument]) -> String {
    let mut csv = String::new();
    for doc in docs {
        for question in &doc.questions {
            csv.push_str(&format!("\"{}\",\"{}\"\n", question, doc.id));
        }
    }
    csv
}

/// Speech recognition corpus
pub fn to_corpus(docs: &[ContentDocument]) -> String {
    let mut text = String::new();
    for doc in docs {
        text.push_str(CORPUS_QUESTIONS);
        text.push('\n');
        for question in &doc.questions {
            text.push_str(question);
            text.push('\n');
        }
        text.push_str(CORPUS_ANSWER);
        text.push('\n');
        text.push_str(&doc.message);
        text.push('\n');
    }
    text
}
