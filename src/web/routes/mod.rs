pub mod category_routes;
pub mod todo_ai_routes;
pub mod todo_routes;
pub mod user_routes;
