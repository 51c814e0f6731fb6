//! Speech recognition customization detail and word uploads

use crate::clients::{CustomWord, ServiceResult, SpeechToTextService};
use qam_common::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A customization with its corpora and words
#[derive(Debug, Clone, Serialize)]
pub struct SpeechModelDetail {
    pub model: Value,
    pub corpora: Vec<Value>,
    #[serde(rename = "word")]
    pub words: Vec<Value>,
}

/// Fetch model, corpora and words of one customization concurrently
pub async fn customization_detail(
    stt: &dyn SpeechToTextService,
    customization_id: &str,
) -> ServiceResult<SpeechModelDetail> {
    let (model, corpora, words) = futures::try_join!(
        stt.get_customization(customization_id),
        stt.list_corpora(customization_id),
        stt.list_words(customization_id),
    )?;

    Ok(SpeechModelDetail {
        model,
        corpora,
        words,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WordUpload {
    List(Vec<CustomWord>),
    Wrapped { words: Vec<CustomWord> },
}

/// Parse an uploaded word file
///
/// Accepts a JSON array of words or the service's own `{"words": [...]}`
/// shape. An empty list or a blank word is rejected.
pub fn parse_word_upload(bytes: &[u8]) -> qam_common::Result<Vec<CustomWord>> {
    let upload: WordUpload = serde_json::from_slice(bytes)
        .map_err(|e| Error::InvalidInput(format!("invalid word file: {}", e)))?;

    let words = match upload {
        WordUpload::List(words) | WordUpload::Wrapped { words } => words,
    };

    if words.is_empty() {
        return Err(Error::InvalidInput("word file contains no words".to_string()));
    }
    if let Some(index) = words.iter().position(|w| w.word.trim().is_empty()) {
        return Err(Error::InvalidInput(format!("word {} is blank", index)));
    }

    Ok(words)
}
