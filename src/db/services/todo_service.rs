use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::{BTreeSet, HashMap};

use super::Pagination;
use super::user_service::find_users_by_ids;
use crate::db::entities::prelude::{Category, CategoryColumn, Todo, TodoColumn};
use crate::db::entities::todo::{self, TodoStatus};
use crate::db::models::{CategoryDetail, TodoDetail, TodoInput, UserInfo};

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Todo not found: {0}")]
    NotFound(i32),
    #[error("Category {0} referenced by the todo does not exist")]
    CategoryNotFound(i32),
    #[error("Owner {0} of the todo no longer exists")]
    OwnerNotFound(i32),
    #[error("Status cannot change from {from} to {to}")]
    InvalidTransition { from: TodoStatus, to: TodoStatus },
}

/// Which rows a todo listing returns. The variants are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFilter {
    All,
    Status(TodoStatus),
    /// Todos whose `date_time` falls on this UTC calendar day.
    Date(NaiveDate),
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Stores a new todo with status `OnGoing`.
    async fn add_todo(&self, user_id: i32, input: TodoInput) -> Result<todo::Model, TodoError>;

    async fn get_todos(
        &self,
        user_id: i32,
        pagination: Pagination,
        filter: TodoFilter,
    ) -> Result<Vec<TodoDetail>, TodoError>;

    async fn get_todo(&self, todo_id: i32, user_id: i32) -> Result<TodoDetail, TodoError>;

    async fn update_todo(
        &self,
        todo_id: i32,
        user_id: i32,
        input: TodoInput,
    ) -> Result<todo::Model, TodoError>;

    async fn update_todo_status(
        &self,
        todo_id: i32,
        user_id: i32,
        status: TodoStatus,
    ) -> Result<todo::Model, TodoError>;

    async fn delete_todo(&self, todo_id: i32, user_id: i32) -> Result<(), TodoError>;
}

pub struct TodoService {
    db: DatabaseConnection,
}

impl TodoService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_owned(&self, todo_id: i32, user_id: i32) -> Result<todo::Model, TodoError> {
        Todo::find_by_id(todo_id)
            .filter(TodoColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(TodoError::NotFound(todo_id))
    }
}

fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Attaches category and owner to every todo with two batched lookups keyed
/// by the distinct ids of the batch. A category that is missing or belongs to
/// someone else fails the whole read.
async fn attach_relations<C>(
    conn: &C,
    todos: Vec<todo::Model>,
) -> Result<Vec<TodoDetail>, TodoError>
where
    C: ConnectionTrait,
{
    if todos.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids: BTreeSet<i32> = todos.iter().map(|t| t.category_id).collect();
    let owner_ids: BTreeSet<i32> = todos.iter().map(|t| t.user_id).collect();

    let categories: HashMap<i32, _> = Category::find()
        .filter(CategoryColumn::Id.is_in(category_ids))
        .filter(CategoryColumn::UserId.is_in(owner_ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let owners = find_users_by_ids(conn, owner_ids).await?;

    todos
        .into_iter()
        .map(|model| {
            let category = categories
                .get(&model.category_id)
                .filter(|c| c.user_id == model.user_id)
                .cloned()
                .ok_or(TodoError::CategoryNotFound(model.category_id))?;
            let owner = owners
                .get(&model.user_id)
                .cloned()
                .map(UserInfo::from)
                .ok_or(TodoError::OwnerNotFound(model.user_id))?;
            let category = CategoryDetail::new(category, owner.clone());
            Ok(TodoDetail::new(model, category, owner))
        })
        .collect()
}

#[async_trait]
impl TodoStore for TodoService {
    async fn add_todo(&self, user_id: i32, input: TodoInput) -> Result<todo::Model, TodoError> {
        let now = Utc::now();
        let model = todo::ActiveModel {
            user_id: Set(user_id),
            category_id: Set(input.category_id),
            memo: Set(input.memo),
            date_time: Set(input.date_time),
            status: Set(TodoStatus::OnGoing),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model)
    }

    async fn get_todos(
        &self,
        user_id: i32,
        pagination: Pagination,
        filter: TodoFilter,
    ) -> Result<Vec<TodoDetail>, TodoError> {
        let query = Todo::find().filter(TodoColumn::UserId.eq(user_id));
        let query = match filter {
            TodoFilter::All => query,
            TodoFilter::Status(status) => query.filter(TodoColumn::Status.eq(status)),
            TodoFilter::Date(day) => {
                let (start, end) = day_bounds(day);
                query
                    .filter(TodoColumn::DateTime.gte(start))
                    .filter(TodoColumn::DateTime.lt(end))
            }
        };

        let todos = query
            .order_by_asc(TodoColumn::Id)
            .offset(pagination.offset())
            .limit(pagination.per_page())
            .all(&self.db)
            .await?;

        attach_relations(&self.db, todos).await
    }

    async fn get_todo(&self, todo_id: i32, user_id: i32) -> Result<TodoDetail, TodoError> {
        let model = self.find_owned(todo_id, user_id).await?;
        attach_relations(&self.db, vec![model])
            .await?
            .pop()
            .ok_or(TodoError::NotFound(todo_id))
    }

    async fn update_todo(
        &self,
        todo_id: i32,
        user_id: i32,
        input: TodoInput,
    ) -> Result<todo::Model, TodoError> {
        let mut active: todo::ActiveModel = self.find_owned(todo_id, user_id).await?.into();
        active.memo = Set(input.memo);
        active.date_time = Set(input.date_time);
        active.category_id = Set(input.category_id);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    async fn update_todo_status(
        &self,
        todo_id: i32,
        user_id: i32,
        status: TodoStatus,
    ) -> Result<todo::Model, TodoError> {
        let current = self.find_owned(todo_id, user_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(TodoError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let mut active: todo::ActiveModel = current.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    async fn delete_todo(&self, todo_id: i32, user_id: i32) -> Result<(), TodoError> {
        self.find_owned(todo_id, user_id).await?;

        let result = Todo::delete_many()
            .filter(TodoColumn::Id.eq(todo_id))
            .filter(TodoColumn::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TodoError::NotFound(todo_id));
        }
        Ok(())
    }
}
