//! Answer resolution
//!
//! Maps a predicted label to its canned response and applies the
//! time-of-day greeting rule to the `general_hello` answer.

use crate::clients::{Classification, ClassifierService, DocumentStore, ServiceResult};
use crate::models::{Answer, ContentDocument};
use crate::services::{accumulate_ordered, decode_document};
use qam_common::ReferenceTime;
use serde::Serialize;
use tracing::{debug, warn};

/// Label whose answer gets a time-of-day greeting
pub const GREETING_LABEL: &str = "general_hello";

/// Word replaced by the time-of-day greeting
const HELLO: &str = "こんにちは";

/// Prefix of the placeholder message for an unknown label
pub const ERROR_MESSAGE: &str = "エラーが発生しました。";

/// Greeting replacing "こんにちは" at the given hour, `None` during the day
pub fn greeting_for_hour(hour: u32) -> Option<&'static str> {
    match hour {
        17..=u32::MAX => Some("こんばんは"),
        5..=10 => Some("おはようございます"),
        0..=4 => Some("お疲れ様です"),
        _ => None,
    }
}

/// Apply the greeting rule to a resolved message
///
/// Only the `general_hello` label is rewritten; every occurrence of
/// "こんにちは" is replaced.
pub fn apply_greeting(label: &str, message: &str, hour: u32) -> String {
    if label != GREETING_LABEL {
        return message.to_string();
    }
    match greeting_for_hour(hour) {
        Some(greeting) => message.replace(HELLO, greeting),
        None => message.to_string(),
    }
}

/// Resolve one label into a display-ready answer
///
/// A missing content document is recovered into a placeholder answer
/// (empty label, error message with the store's payload, confidence 0).
/// Any other store failure is returned.
pub async fn resolve_answer(
    store: &dyn DocumentStore,
    label: &str,
    confidence: f64,
    now: &ReferenceTime,
) -> ServiceResult<Answer> {
    let doc = match store.get(label).await {
        Ok(value) => decode_document::<ContentDocument>(value)?,
        Err(e) if e.is_not_found() => {
            warn!(label, "No content document for label");
            return Ok(Answer {
                label: String::new(),
                message: format!("{}{}", ERROR_MESSAGE, e.payload()),
                confidence: 0.0,
            });
        }
        Err(e) => return Err(e),
    };

    let message = apply_greeting(&doc.id, &doc.message, now.hour());
    Ok(Answer {
        label: doc.id,
        message,
        confidence,
    })
}

/// Classifier output plus the answer for every ranked class
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResult {
    pub raw: Classification,
    pub table: Vec<Answer>,
}

/// Classify `text`, then resolve an answer for every returned class
///
/// Answers keep the classifier's ranking and confidences.
pub async fn classify_with_answers(
    classifier: &dyn ClassifierService,
    store: &dyn DocumentStore,
    classifier_id: &str,
    text: &str,
    now: &ReferenceTime,
    fan_out_limit: usize,
) -> ServiceResult<ClassifyResult> {
    let raw = classifier.classify(classifier_id, text).await?;
    debug!(classifier_id, classes = raw.classes.len(), top_class = ?raw.top_class, "Classified text");

    let table = accumulate_ordered(&raw.classes, fan_out_limit, |class| {
        resolve_answer(store, &class.class_name, class.confidence, now)
    })
    .await?;

    Ok(ClassifyResult { raw, table })
}
