//! 2048 (workspace facade crate).
//!
//! Re-exports the per-concern crates under `crates/` as
//! `tiles2048::{core,adapter,types}` and hosts the headless game loop that
//! connects them.

pub mod host;

pub use tiles2048_adapter as adapter;
pub use tiles2048_core as core;
pub use tiles2048_types as types;
