use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::info;

use self::entities::prelude::{Category, Todo, User};

pub mod entities;
pub mod models;
pub mod services;

/// Opens the connection pool.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(10).sqlx_logging(false);
    Database::connect(opt).await
}

/// Creates the users, categories and todos tables when they are missing.
/// There is no versioning; existing tables are left untouched.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Todo),
    ];
    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    info!(backend = ?backend, "Database schema is up to date.");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_connection() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    // A single connection keeps every query on the same in-memory database.
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    migrate(&db).await.unwrap();
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = test_connection().await;
        migrate(&db).await.unwrap();
    }
}
