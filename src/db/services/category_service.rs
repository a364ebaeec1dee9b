use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::Pagination;
use super::user_service::find_users_by_ids;
use crate::db::entities::category;
use crate::db::entities::prelude::{Category, CategoryColumn};
use crate::db::models::{CategoryDetail, CategoryInput, UserInfo};

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Category not found: {0}")]
    NotFound(i32),
    #[error("Owner {0} of the category no longer exists")]
    OwnerNotFound(i32),
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn add_category(
        &self,
        user_id: i32,
        input: CategoryInput,
    ) -> Result<CategoryDetail, CategoryError>;

    async fn get_categories(
        &self,
        user_id: i32,
        pagination: Pagination,
    ) -> Result<Vec<CategoryDetail>, CategoryError>;

    async fn get_category(
        &self,
        category_id: i32,
        user_id: i32,
    ) -> Result<CategoryDetail, CategoryError>;

    async fn update_category(
        &self,
        category_id: i32,
        user_id: i32,
        input: CategoryInput,
    ) -> Result<CategoryDetail, CategoryError>;

    async fn delete_category(&self, category_id: i32, user_id: i32) -> Result<(), CategoryError>;
}

pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_owned(
        &self,
        category_id: i32,
        user_id: i32,
    ) -> Result<category::Model, CategoryError> {
        Category::find_by_id(category_id)
            .filter(CategoryColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(CategoryError::NotFound(category_id))
    }
}

/// Attaches each category's owner, loading all owners of the batch at once.
async fn attach_owners<C>(
    conn: &C,
    categories: Vec<category::Model>,
) -> Result<Vec<CategoryDetail>, CategoryError>
where
    C: ConnectionTrait,
{
    let owners = find_users_by_ids(conn, categories.iter().map(|c| c.user_id)).await?;

    categories
        .into_iter()
        .map(|model| {
            let owner = owners
                .get(&model.user_id)
                .cloned()
                .ok_or(CategoryError::OwnerNotFound(model.user_id))?;
            Ok(CategoryDetail::new(model, UserInfo::from(owner)))
        })
        .collect()
}

async fn attach_owner<C>(conn: &C, model: category::Model) -> Result<CategoryDetail, CategoryError>
where
    C: ConnectionTrait,
{
    let owner_id = model.user_id;
    let owner = find_users_by_ids(conn, [owner_id])
        .await?
        .remove(&owner_id)
        .ok_or(CategoryError::OwnerNotFound(owner_id))?;
    Ok(CategoryDetail::new(model, UserInfo::from(owner)))
}

#[async_trait]
impl CategoryStore for CategoryService {
    async fn add_category(
        &self,
        user_id: i32,
        input: CategoryInput,
    ) -> Result<CategoryDetail, CategoryError> {
        let now = Utc::now();
        let model = category::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name),
            color: Set(input.color),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        attach_owner(&self.db, model).await
    }

    async fn get_categories(
        &self,
        user_id: i32,
        pagination: Pagination,
    ) -> Result<Vec<CategoryDetail>, CategoryError> {
        let categories = Category::find()
            .filter(CategoryColumn::UserId.eq(user_id))
            .order_by_asc(CategoryColumn::Id)
            .offset(pagination.offset())
            .limit(pagination.per_page())
            .all(&self.db)
            .await?;

        attach_owners(&self.db, categories).await
    }

    async fn get_category(
        &self,
        category_id: i32,
        user_id: i32,
    ) -> Result<CategoryDetail, CategoryError> {
        let model = self.find_owned(category_id, user_id).await?;
        attach_owner(&self.db, model).await
    }

    async fn update_category(
        &self,
        category_id: i32,
        user_id: i32,
        input: CategoryInput,
    ) -> Result<CategoryDetail, CategoryError> {
        let mut active: category::ActiveModel = self.find_owned(category_id, user_id).await?.into();
        active.name = Set(input.name);
        active.color = Set(input.color);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        attach_owner(&self.db, model).await
    }

    async fn delete_category(&self, category_id: i32, user_id: i32) -> Result<(), CategoryError> {
        self.find_owned(category_id, user_id).await?;

        let result = Category::delete_many()
            .filter(CategoryColumn::Id.eq(category_id))
            .filter(CategoryColumn::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(CategoryError::NotFound(category_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewUser;
    use crate::db::services::user_service::{DEFAULT_CATEGORY_NAME, UserService, UserStore};
    use crate::db::test_connection;

    async fn setup() -> (CategoryService, i32, i32) {
        let db = test_connection().await;
        let users = UserService::new(db.clone()).with_hash_cost(4);
        let mut ids = Vec::new();
        for email in ["owner@example.com", "other@example.com"] {
            let user = users
                .register(NewUser {
                    name: "User".to_string(),
                    email: email.to_string(),
                    password: "password".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (CategoryService::new(db), ids[0], ids[1])
    }

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            color: "#ffffff".to_string(),
        }
    }

    #[tokio::test]
    async fn list_is_scoped_and_paginated() {
        let (categories, owner, other) = setup().await;
        for name in ["Work", "Home", "Gym"] {
            categories.add_category(owner, input(name)).await.unwrap();
        }

        // Default category first, then the three above, ordered by id.
        let page = categories
            .get_categories(owner, Pagination::new(2, 2).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Home", "Gym"]);
        assert!(page.iter().all(|c| c.user.id == owner));

        let others = categories
            .get_categories(other, Pagination::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].name, DEFAULT_CATEGORY_NAME);
    }

    #[tokio::test]
    async fn foreign_category_is_not_found() {
        let (categories, owner, other) = setup().await;
        let created = categories.add_category(owner, input("Private")).await.unwrap();

        assert!(matches!(
            categories.get_category(created.id, other).await,
            Err(CategoryError::NotFound(id)) if id == created.id
        ));
        assert!(matches!(
            categories.update_category(created.id, other, input("Hijacked")).await,
            Err(CategoryError::NotFound(_))
        ));
        assert!(matches!(
            categories.delete_category(created.id, other).await,
            Err(CategoryError::NotFound(_))
        ));

        let untouched = categories.get_category(created.id, owner).await.unwrap();
        assert_eq!(untouched.name, "Private");
    }

    #[tokio::test]
    async fn update_overwrites_name_and_color() {
        let (categories, owner, _) = setup().await;
        let created = categories.add_category(owner, input("Old")).await.unwrap();

        let updated = categories
            .update_category(
                created.id,
                owner,
                CategoryInput {
                    name: "New".to_string(),
                    color: "#000000".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.color, "#000000");
        assert_eq!(updated.user.id, owner);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (categories, owner, _) = setup().await;
        let created = categories.add_category(owner, input("Temp")).await.unwrap();

        categories.delete_category(created.id, owner).await.unwrap();
        assert!(matches!(
            categories.get_category(created.id, owner).await,
            Err(CategoryError::NotFound(_))
        ));
    }
}
