//! Tool service: `GET /tools`, `POST /call`, `GET /health`.
//!
//! Binds only to loopback by default (§4.D). Tool execution is behind the
//! [`ToolHandler`] trait — this crate owns the authorization pipeline and
//! the wire contract, not the tools' domain logic.

mod auth;
mod config;
mod registry;
mod server;

pub use auth::AuthError;
pub use config::ToolServiceConfig;
pub use registry::{ToolHandler, ToolRegistry};
pub use server::build_router;
