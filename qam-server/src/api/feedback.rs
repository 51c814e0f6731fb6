//! Feedback log browsing

use axum::{
    extract::{rejection::FormRejection, Path, State},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;

use crate::api::form_or_default;
use crate::api::stt::non_blank;
use crate::clients::{ViewRow, WriteResult};
use crate::services::feedback::{delete_feedback, list_feedback};
use crate::{ApiError, ApiResult, AppState};

/// GET /feedback
///
/// View rows keyed by record timestamp, oldest first.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ViewRow>>> {
    Ok(Json(list_feedback(state.backends.feedback.as_ref()).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteFeedbackForm {
    #[serde(default)]
    pub rev: Option<String>,
}

/// POST /feedback/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<DeleteFeedbackForm>, FormRejection>,
) -> ApiResult<Json<WriteResult>> {
    let form = form_or_default(form)?;
    let rev = non_blank(form.rev)
        .ok_or_else(|| ApiError::BadRequest("\"rev\" is required".to_string()))?;
    let result = delete_feedback(state.backends.feedback.as_ref(), &id, &rev).await?;
    Ok(Json(result))
}

/// Build feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(list))
        .route("/feedback/:id/delete", post(delete))
}
