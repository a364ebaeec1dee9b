#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mytodo::db::services::{CategoryService, TodoService, UserService};
use mytodo::services::auth_service::TokenService;
use mytodo::services::openai_client::AiError;
use mytodo::services::todo_ai_service::{TodoAiInput, TodoSuggester};
use mytodo::web::{AppState, create_axum_router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::{Layer, ServiceExt};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

pub const SECRET: &str = "integration-secret";

pub async fn sqlite_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    mytodo::db::migrate(&db).await.unwrap();
    db
}

/// Suggester that records inputs and replies with a canned answer, or fails
/// when no answer is set.
#[derive(Default)]
pub struct FakeSuggester {
    pub answer: Option<String>,
    pub inputs: Mutex<Vec<TodoAiInput>>,
}

#[async_trait]
impl TodoSuggester for FakeSuggester {
    async fn suggest(&self, input: TodoAiInput) -> Result<String, AiError> {
        self.inputs.lock().unwrap().push(input);
        self.answer.clone().ok_or(AiError::EmptyResponse)
    }
}

pub struct TestApp {
    pub service: NormalizePath<Router>,
    pub suggester: Arc<FakeSuggester>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(FakeSuggester {
        answer: Some("Take a 30 minute walk after lunch.".to_string()),
        ..Default::default()
    })
    .await
}

pub async fn spawn_app_with(suggester: FakeSuggester) -> TestApp {
    let db = sqlite_db().await;
    let suggester = Arc::new(suggester);
    let state = AppState {
        users: Arc::new(UserService::new(db.clone()).with_hash_cost(4)),
        categories: Arc::new(CategoryService::new(db.clone())),
        todos: Arc::new(TodoService::new(db)),
        suggester: suggester.clone(),
        tokens: Arc::new(TokenService::new(SECRET)),
    };
    let router = create_axum_router(Arc::new(state));
    TestApp {
        service: NormalizePathLayer::trim_trailing_slash().layer(router),
        suggester,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.service.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Option<Value>) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), body).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user and logs in, returning the access token.
    pub async fn signup_and_login(&self, name: &str, email: &str) -> String {
        let signup = self
            .post(
                "/signup",
                None,
                serde_json::json!({ "name": name, "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED);

        let login = self
            .post(
                "/auth",
                None,
                serde_json::json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["data"]["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}
