//! Application state for the web layer.

use std::sync::Arc;

use crate::bot::Bot;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
}

impl AppState {
    pub fn new(bot: Bot) -> Self {
        Self { bot: Arc::new(bot) }
    }
}
