//! HTTP API and embedded web page
//!
//! Each browser is tied to one `ChatSession` through a cookie; every
//! handler looks the session up in the store and works on it under its lock.

mod assets;
mod handlers;
mod types;

pub use assets::Assets;
pub use handlers::create_router;

use crate::runtime::ProductionRunner;
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub runner: Arc<ProductionRunner>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionStore>, runner: ProductionRunner) -> Self {
        Self {
            sessions,
            runner: Arc::new(runner),
        }
    }
}
