//! Upload Registry - signed-upload cache and recent-uploads list
//!
//! Caches signed-upload authorizations per canonical parameter set and keeps
//! a capped, newest-first list of uploaded asset identifiers, both on one
//! shared key-value store (Redis or in-memory).

pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod registry;
pub mod signature;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{RegistryError, Result};
pub use tasks::spawn_cleanup_task;
