//! Generic agent-side RPC handler contract (spec §4.J).
//!
//! Any HTTP process that wants to be discoverable and invokable by the
//! orchestrator wires its skill implementations up through this crate's
//! [`SkillHandler`] trait and [`build_router`]. This crate owns dispatch
//! and validation only — the skills' detection logic is an external
//! collaborator (spec.md §1).

mod config;
mod router;
mod skill;

pub use config::AgentSdkConfig;
pub use router::build_router;
pub use skill::SkillHandler;
