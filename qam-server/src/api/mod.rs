//! HTTP API handlers for qam-server
//!
//! JSON in, JSON out, except the export endpoints which return text.

pub mod content;
pub mod feedback;
pub mod health;
pub mod nlc;
pub mod stt;
pub mod tts;
pub mod upload;

pub use content::content_routes;
pub use feedback::feedback_routes;
pub use health::health_routes;
pub use nlc::nlc_routes;
pub use stt::stt_routes;
pub use tts::tts_routes;

use axum::extract::rejection::FormRejection;
use axum::Form;

use crate::{ApiError, ApiResult};

/// Urlencoded form body, or the form's defaults when the body is not a form
///
/// Operator tools post these endpoints without a body when every field is
/// optional. A urlencoded body that fails to decode is a 400.
pub(crate) fn form_or_default<T: Default>(
    form: Result<Form<T>, FormRejection>,
) -> ApiResult<T> {
    match form {
        Ok(Form(value)) => Ok(value),
        Err(FormRejection::InvalidFormContentType(_)) => Ok(T::default()),
        Err(e) => Err(ApiError::BadRequest(e.body_text())),
    }
}
