// ABOUTME: HTTP server for petstore, providing the pet REST API and health probes.
// ABOUTME: Also owns the service lifecycle that opens the store, serves, and shuts down on signal.

pub mod api;
pub mod app_state;
pub mod lifecycle;
pub mod routes;
pub mod signal;

pub use app_state::{AppState, SharedState};
pub use lifecycle::{Server, ServerError, ServerHandle, ShutdownSignal};
pub use routes::create_router;
pub use signal::forward_os_signals;
