use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use std::sync::Arc;

use crate::services::openai_client::AiError;
use crate::services::todo_ai_service::TodoAiInput;
use crate::web::extract::AppJson;
use crate::web::models::{ApiResponse, SuggestionResponse};
use crate::web::{AppError, AppState};

pub fn todo_ai_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(suggest_todo))
}

async fn suggest_todo(
    State(app_state): State<Arc<AppState>>,
    AppJson(payload): AppJson<TodoAiInput>,
) -> Result<(StatusCode, Json<ApiResponse<SuggestionResponse>>), AppError> {
    let content = app_state.suggester.suggest(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Get todo recommendation successful",
            SuggestionResponse { content },
        )),
    ))
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::InternalServerError(format!("Todo recommendation failed: {err}"))
    }
}
