//! HTTP surface: REST handlers and router assembly.

pub mod handlers;
pub mod routes;

pub use routes::{router, AppState};
