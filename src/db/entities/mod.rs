//! SeaORM entities for the users, categories and todos tables.

pub mod category;
pub mod todo;
pub mod user;

pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;

    pub use super::category::Entity as Category;
    pub use super::category::Model as CategoryModel;
    pub use super::category::ActiveModel as CategoryActiveModel;
    pub use super::category::Column as CategoryColumn;

    pub use super::todo::Entity as Todo;
    pub use super::todo::Model as TodoModel;
    pub use super::todo::ActiveModel as TodoActiveModel;
    pub use super::todo::Column as TodoColumn;
}
