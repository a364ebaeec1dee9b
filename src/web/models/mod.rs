use serde::{Deserialize, Serialize};

use crate::db::models::UserInfo;
use crate::db::services::Pagination;
use crate::web::error::AppError;

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub info: UserInfo,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub iat: usize,
    pub exp: usize,
}

/// Inserted into the request extensions by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: i32,
}

/// `?page=&content=` where `content` is the page size.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: u64,
    pub content: u64,
}

impl PageQuery {
    pub fn pagination(&self) -> Result<Pagination, AppError> {
        pagination(self.page, self.content)
    }
}

#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    pub page: u64,
    pub content: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl TodoListQuery {
    pub fn pagination(&self) -> Result<Pagination, AppError> {
        pagination(self.page, self.content)
    }
}

fn pagination(page: u64, content: u64) -> Result<Pagination, AppError> {
    Pagination::new(page, content).ok_or_else(|| {
        AppError::InvalidInput("page and content must be positive integers within range".to_string())
    })
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub content: String,
}
