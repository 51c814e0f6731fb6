//! Domain services
//!
//! Each service takes its collaborators as trait objects so it can be driven
//! by the HTTP handlers in production and by fakes in tests.

pub mod accumulate;
pub mod answer;
pub mod classifiers;
pub mod export;
pub mod feedback;
pub mod reload;
pub mod speech;

use crate::clients::{ServiceError, ServiceResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use accumulate::accumulate_ordered;

/// Decode a stored document into its typed form
pub(crate) fn decode_document<T: DeserializeOwned>(value: Value) -> ServiceResult<T> {
    serde_json::from_value(value).map_err(|e| ServiceError::Decode {
        service: "Document store",
        message: e.to_string(),
    })
}
