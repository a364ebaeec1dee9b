use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, RuntimeErr, Set, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};
use tokio::task::{self, JoinError};
use tracing::info;

use crate::db::entities::prelude::{User, UserColumn};
use crate::db::entities::{category, user};
use crate::db::models::NewUser;
use crate::services::auth_service::{AuthError, hash_password, verify_password};

pub const DEFAULT_CATEGORY_NAME: &str = "My Reminders";
pub const DEFAULT_CATEGORY_COLOR: &str = "#3f48cc";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Email '{0}' is already registered")]
    EmailTaken(String),
    #[error("No user matches these credentials")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Password task failed: {0}")]
    Blocking(#[from] JoinError),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user and its default category in one transaction.
    async fn register(&self, new_user: NewUser) -> Result<user::Model, UserError>;

    /// Exact email match on a live account plus password verification.
    async fn login(&self, email: &str, password: &str) -> Result<user::Model, UserError>;
}

pub struct UserService {
    db: DatabaseConnection,
    hash_cost: u32,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}

#[async_trait]
impl UserStore for UserService {
    async fn register(&self, new_user: NewUser) -> Result<user::Model, UserError> {
        let name = new_user.name.trim();
        let email = new_user.email.trim();
        if name.is_empty() || email.is_empty() || new_user.password.is_empty() {
            return Err(UserError::InvalidInput(
                "name, email and password are required".to_string(),
            ));
        }

        // bcrypt is CPU-bound; keep it off the async workers.
        let password = new_user.password;
        let cost = self.hash_cost;
        let password_hash = task::spawn_blocking(move || hash_password(&password, cost)).await??;

        // Dropping the transaction on an early return rolls it back.
        let txn = self.db.begin().await?;

        if User::find()
            .filter(UserColumn::Email.eq(email))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(UserError::EmailTaken(email.to_string()));
        }

        let now = Utc::now();
        let user_model = user::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|db_err| {
            if is_unique_violation(&db_err) {
                UserError::EmailTaken(email.to_string())
            } else {
                UserError::DbErr(db_err)
            }
        })?;

        category::ActiveModel {
            user_id: Set(user_model.id),
            name: Set(DEFAULT_CATEGORY_NAME.to_string()),
            color: Set(DEFAULT_CATEGORY_COLOR.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(user_id = user_model.id, "Registered user with default category.");
        Ok(user_model)
    }

    async fn login(&self, email: &str, password: &str) -> Result<user::Model, UserError> {
        let user_model = User::find()
            .filter(UserColumn::Email.eq(email))
            .filter(UserColumn::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound)?;

        let password = password.to_owned();
        let password_hash = user_model.password_hash.clone();
        let matches =
            task::spawn_blocking(move || verify_password(&password, &password_hash)).await??;
        if !matches {
            return Err(UserError::NotFound);
        }

        Ok(user_model)
    }
}

/// Loads the users with the given ids in one query, keyed by id.
pub(crate) async fn find_users_by_ids<C>(
    conn: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, user::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = User::find()
        .filter(UserColumn::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

fn is_unique_violation(db_err: &DbErr) -> bool {
    match db_err {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(database_error)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(database_error))) => {
            database_error.is_unique_violation()
        }
        _ => false,
    }
}
