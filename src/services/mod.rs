pub mod auth_service;
pub mod openai_client;
pub mod todo_ai_service;
