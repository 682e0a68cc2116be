// ABOUTME: Core library for petstore, containing the pet record and configuration types.
// ABOUTME: Shared by the storage backends, the HTTP server, and the binary.

pub mod config;
pub mod pet;

pub use config::{Config, ConfigError, ServerConfig, SqliteConfig, StoreConfig};
pub use pet::Pet;
