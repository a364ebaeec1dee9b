use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::info;

use crate::db::models::{NewUser, UserInfo};
use crate::db::services::UserError;
use crate::services::auth_service::AuthError;
use crate::web::extract::AppJson;
use crate::web::middleware::auth::TOKEN_COOKIE;
use crate::web::models::{ApiResponse, LoginRequest, LoginResponse};
use crate::web::{AppError, AppState};

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(register_handler))
        .route("/auth", post(login_handler))
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    AppJson(payload): AppJson<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), AppError> {
    let user = app_state.users.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Register successful", UserInfo::from(user))),
    ))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .users
        .login(&payload.email, &payload.password)
        .await?;
    let access_token = app_state.tokens.issue_token(user.id)?;
    info!(user_id = user.id, "User logged in.");

    let auth_cookie = Cookie::build((TOKEN_COOKIE, access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    let body = LoginResponse {
        access_token,
        info: UserInfo::from(user),
    };
    Ok((
        jar.add(auth_cookie),
        Json(ApiResponse::new("Login successful", body)),
    ))
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            UserError::InvalidInput(msg) => AppError::InvalidInput(msg),
            UserError::EmailTaken(email) => {
                AppError::Conflict(format!("Email '{email}' is already registered"))
            }
            UserError::NotFound => AppError::NotFound("Invalid email or password".to_string()),
            UserError::Auth(e) => e.into(),
            UserError::Blocking(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
