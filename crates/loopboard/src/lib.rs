//! Loopboard - live status board for iterative pipeline runs.
//!
//! A single-process broadcaster: an external pipeline reports lifecycle
//! events over HTTP, the server keeps the current run's snapshot in memory,
//! and viewers follow along over WebSocket:
//!
//! - `POST /api/pipeline/start`, `iteration/start`, `step/start`,
//!   `step/complete`, `pipeline/finish` — event intake from the pipeline
//! - `GET /ws` — push channel; full snapshot on connect, then increments
//! - `GET /api/state` — on-demand snapshot, gated by optional credentials
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use loopboard::{AppState, DashboardConfig, create_router};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DashboardConfig::default();
//!     let bind_address = config.bind_address;
//!     let state = Arc::new(AppState::with_config(config));
//!
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind(bind_address).await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod hub;
pub mod server;
pub mod snapshot;
pub mod state;
pub mod ws;

pub use config::{DashboardConfig, ViewerCredentials};
pub use error::ApiError;
pub use hub::EventHub;
pub use server::create_router;
pub use snapshot::{Iteration, RunStatus, Snapshot};
pub use state::AppState;
pub use ws::events::WsEvent;
