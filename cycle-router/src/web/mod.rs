//! Web layer for the cycle route planner.
//!
//! Provides HTTP endpoints for station search and route planning.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
