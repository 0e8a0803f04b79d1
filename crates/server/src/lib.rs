//! Support agent server
//!
//! WebSocket chat transport plus a small HTTP surface (health and
//! per-session stats).

pub mod http;
pub mod state;
pub mod websocket;

pub use http::create_router;
pub use state::AppState;
