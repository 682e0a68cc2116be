// ABOUTME: API module aggregating the pet CRUD and health handlers.
// ABOUTME: Each sub-module groups related endpoints; error bodies are shared.

pub mod error;
pub mod health;
pub mod pets;

pub use error::ApiError;
