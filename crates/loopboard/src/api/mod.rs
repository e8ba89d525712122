//! API endpoint handlers.

pub mod health;
pub mod pipeline;
pub mod state;
