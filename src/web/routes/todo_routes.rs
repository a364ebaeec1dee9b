use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::db::entities::todo::{self, TodoStatus};
use crate::db::models::{TodoDetail, TodoInput};
use crate::db::services::{TodoError, TodoFilter};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::models::{ApiResponse, AuthenticatedUser, StatusQuery, TodoListQuery};
use crate::web::{AppError, AppState};

pub fn todo_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/status/{id}", put(update_todo_status))
        .route("/{id}", get(get_todo).put(update_todo).delete(delete_todo))
}

fn parse_status(raw: &str) -> Result<TodoStatus, AppError> {
    raw.parse::<TodoStatus>().map_err(AppError::InvalidInput)
}

/// A non-empty `status` wins over a non-empty `date`; neither means all.
fn list_filter(query: &TodoListQuery) -> Result<TodoFilter, AppError> {
    let status = query.status.as_deref().filter(|s| !s.is_empty());
    let date = query.date.as_deref().filter(|d| !d.is_empty());

    match (status, date) {
        (Some(status), _) => Ok(TodoFilter::Status(parse_status(status)?)),
        (None, Some(date)) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(TodoFilter::Date)
            .map_err(|_| AppError::InvalidInput(format!("date '{date}' is not YYYY-MM-DD"))),
        (None, None) => Ok(TodoFilter::All),
    }
}

async fn create_todo(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(payload): AppJson<TodoInput>,
) -> Result<(StatusCode, Json<ApiResponse<todo::Model>>), AppError> {
    let todo = app_state.todos.add_todo(user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Add todo successful", todo)),
    ))
}

async fn list_todos(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<TodoListQuery>,
) -> Result<Json<ApiResponse<Vec<TodoDetail>>>, AppError> {
    let pagination = query.pagination()?;
    let filter = list_filter(&query)?;
    let todos = app_state
        .todos
        .get_todos(user.id, pagination, filter)
        .await?;
    Ok(Json(ApiResponse::new("Get todos successful", todos)))
}

async fn get_todo(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<TodoDetail>>, AppError> {
    let todo = app_state.todos.get_todo(id, user.id).await?;
    Ok(Json(ApiResponse::new("Get todo successful", todo)))
}

async fn update_todo(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<TodoInput>,
) -> Result<Json<ApiResponse<todo::Model>>, AppError> {
    let todo = app_state.todos.update_todo(id, user.id, payload).await?;
    Ok(Json(ApiResponse::new("Update todo successful", todo)))
}

async fn update_todo_status(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
    AppQuery(query): AppQuery<StatusQuery>,
) -> Result<Json<ApiResponse<todo::Model>>, AppError> {
    let status = parse_status(&query.status)?;
    let todo = app_state
        .todos
        .update_todo_status(id, user.id, status)
        .await?;
    Ok(Json(ApiResponse::new("Update todo status successful", todo)))
}

async fn delete_todo(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.todos.delete_todo(id, user.id).await?;
    Ok(Json(ApiResponse::message("Delete todo successful")))
}

impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            TodoError::NotFound(id) => AppError::NotFound(format!("Todo {id} not found")),
            TodoError::CategoryNotFound(id) => {
                AppError::NotFound(format!("Category {id} of the todo not found"))
            }
            TodoError::OwnerNotFound(id) => {
                AppError::NotFound(format!("Owner {id} of the todo not found"))
            }
            e @ TodoError::InvalidTransition { .. } => AppError::InvalidInput(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(status: Option<&str>, date: Option<&str>) -> TodoListQuery {
        TodoListQuery {
            page: 1,
            content: 10,
            status: status.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn status_takes_precedence_over_date() {
        let filter = list_filter(&query(Some("Done"), Some("2023-11-03"))).unwrap();
        assert_eq!(filter, TodoFilter::Status(TodoStatus::Done));
    }

    #[test]
    fn empty_values_fall_through() {
        let day = NaiveDate::from_ymd_opt(2023, 11, 3).unwrap();
        assert_eq!(
            list_filter(&query(Some(""), Some("2023-11-03"))).unwrap(),
            TodoFilter::Date(day)
        );
        assert_eq!(list_filter(&query(Some(""), Some(""))).unwrap(), TodoFilter::All);
        assert_eq!(list_filter(&query(None, None)).unwrap(), TodoFilter::All);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            list_filter(&query(Some("done"), None)),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            list_filter(&query(None, Some("03-11-2023"))),
            Err(AppError::InvalidInput(_))
        ));
    }
}
