//! Multipart upload helpers

use crate::{ApiError, ApiResult};
use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;
use tracing::debug;

/// One multipart part
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub file_name: Option<String>,
    pub data: Bytes,
}

impl UploadPart {
    /// File name without directories and without a `.csv`/`.txt`/`.json`
    /// extension; `None` when the client sent no usable name
    pub fn stem(&self) -> Option<String> {
        self.file_name.as_deref().and_then(file_stem)
    }

    pub fn text(&self, field: &str) -> ApiResult<String> {
        String::from_utf8(self.data.to_vec())
            .map_err(|_| ApiError::BadRequest(format!("\"{}\" is not UTF-8 text", field)))
    }
}

/// Every part of a multipart body, keyed by field name
#[derive(Debug, Default)]
pub struct UploadForm {
    parts: HashMap<String, UploadPart>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut parts = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read \"{}\": {}", name, e)))?;

            debug!(field = %name, file_name = ?file_name, bytes = data.len(), "Received upload part");
            parts.insert(name, UploadPart { file_name, data });
        }

        Ok(Self { parts })
    }

    /// Required non-empty file part
    pub fn file(&self, field: &str) -> ApiResult<&UploadPart> {
        match self.parts.get(field) {
            Some(part) if !part.data.is_empty() => Ok(part),
            Some(_) => Err(ApiError::BadRequest(format!("Uploaded \"{}\" is empty", field))),
            None => Err(ApiError::BadRequest(format!("Missing upload field \"{}\"", field))),
        }
    }
}

/// Strip directories and a known text extension from an uploaded file name
pub fn file_stem(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = [".csv", ".txt", ".json"]
        .iter()
        .find_map(|ext| base.strip_suffix(ext))
        .unwrap_or(base)
        .trim();

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
