//! HTTP delivery surface.
//!
//! The chat gateway posts normalized updates to `/updates` and relays the
//! reply to the chat platform.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
