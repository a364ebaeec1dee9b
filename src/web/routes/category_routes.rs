use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::models::{CategoryDetail, CategoryInput};
use crate::db::services::CategoryError;
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::models::{ApiResponse, AuthenticatedUser, PageQuery};
use crate::web::{AppError, AppState};

pub fn category_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn create_category(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(payload): AppJson<CategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDetail>>), AppError> {
    let category = app_state.categories.add_category(user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Add category successful", category)),
    ))
}

async fn list_categories(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryDetail>>>, AppError> {
    let pagination = query.pagination()?;
    let categories = app_state
        .categories
        .get_categories(user.id, pagination)
        .await?;
    Ok(Json(ApiResponse::new("Get categories successful", categories)))
}

async fn get_category(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<CategoryDetail>>, AppError> {
    let category = app_state.categories.get_category(id, user.id).await?;
    Ok(Json(ApiResponse::new("Get category successful", category)))
}

async fn update_category(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<CategoryInput>,
) -> Result<Json<ApiResponse<CategoryDetail>>, AppError> {
    let category = app_state
        .categories
        .update_category(id, user.id, payload)
        .await?;
    Ok(Json(ApiResponse::new("Update category successful", category)))
}

async fn delete_category(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.categories.delete_category(id, user.id).await?;
    Ok(Json(ApiResponse::message("Delete category successful")))
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            CategoryError::NotFound(id) => AppError::NotFound(format!("Category {id} not found")),
            CategoryError::OwnerNotFound(id) => {
                AppError::NotFound(format!("Owner {id} of the category not found"))
            }
        }
    }
}
