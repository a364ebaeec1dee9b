use axum::{
    Json, Router,
    http::Method,
    middleware as axum_middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::db::services::{
    CategoryService, CategoryStore, TodoService, TodoStore, UserService, UserStore,
};
use crate::services::auth_service::TokenService;
use crate::services::openai_client::OpenAiClient;
use crate::services::todo_ai_service::{TodoAiService, TodoSuggester};
use crate::web::middleware::auth;
use crate::web::models::ApiResponse;
use crate::web::routes::*;

pub use crate::web::error::AppError;

pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;

pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub todos: Arc<dyn TodoStore>,
    pub suggester: Arc<dyn TodoSuggester>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wires the SeaORM stores and the OpenAI-backed suggester.
    pub fn from_database(db: DatabaseConnection, jwt_secret: &str, openai_api_key: &str) -> Self {
        let completion_client = Arc::new(OpenAiClient::new(openai_api_key));
        Self {
            users: Arc::new(UserService::new(db.clone())),
            categories: Arc::new(CategoryService::new(db.clone())),
            todos: Arc::new(TodoService::new(db)),
            suggester: Arc::new(TodoAiService::new(completion_client)),
            tokens: Arc::new(TokenService::new(jwt_secret)),
        }
    }
}

async fn health_check_handler() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("OK"))
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_check_handler))
        .merge(user_routes::user_router())
        .nest(
            "/category",
            category_routes::category_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/todo",
            todo_routes::todo_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/todoai",
            todo_ai_routes::todo_ai_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .layer(trace)
        .layer(cors)
        .with_state(app_state)
}
