//! LLM provider layer.
//!
//! [`Provider`] hides rig-core's per-backend clients; [`resolve_model`] picks
//! the backend and model from flags, config, and built-in defaults.

mod client;
mod kind;
mod resolve;

pub use client::Provider;
pub use resolve::resolve_model;
