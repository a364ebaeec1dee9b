use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::warn;

use crate::web::models::AuthenticatedUser;
use crate::web::{AppState, error::AppError};

pub const TOKEN_COOKIE: &str = "token";

pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    // Authorization header first, then the cookie set by login.
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

    let claims = state.tokens.verify_token(&token).map_err(|e| {
        warn!(error = ?e, "Rejected token in auth middleware.");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut()
        .insert(AuthenticatedUser { id: claims.id });
    Ok(next.run(req).await)
}
