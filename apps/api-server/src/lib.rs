//! # Quill API Server
//!
//! Actix-web application for the Quill blogging API. The binary in `main.rs`
//! only wires these pieces together.

pub mod background;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use state::AppState;
