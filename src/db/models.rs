//! Payloads accepted by the data-access layer and the enriched rows it
//! returns. These double as the JSON bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::todo::TodoStatus;
use crate::db::entities::{category, todo, user};

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Mutable fields of a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    #[serde(rename = "category", alias = "name")]
    pub name: String,
    pub color: String,
}

/// A category together with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub id: i32,
    #[serde(rename = "category")]
    pub name: String,
    pub color: String,
    pub user_id: i32,
    pub user: UserInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryDetail {
    pub fn new(model: category::Model, user: UserInfo) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
            user_id: model.user_id,
            user,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Mutable fields of a todo. Status is deliberately absent: it is set by the
/// server on creation and changed only through the status operation.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoInput {
    pub memo: String,
    pub date_time: DateTime<Utc>,
    pub category_id: i32,
}

/// A todo with its category (and the category's owner) and its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoDetail {
    pub id: i32,
    pub memo: String,
    pub date_time: DateTime<Utc>,
    pub status: TodoStatus,
    pub category_id: i32,
    pub category: CategoryDetail,
    pub user_id: i32,
    pub user: UserInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoDetail {
    pub fn new(model: todo::Model, category: CategoryDetail, user: UserInfo) -> Self {
        Self {
            id: model.id,
            memo: model.memo,
            date_time: model.date_time,
            status: model.status,
            category_id: model.category_id,
            category,
            user_id: model.user_id,
            user,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
