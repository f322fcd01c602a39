//! Retort, a tone-styled reply generation service.
//!
//! Single Rust binary. One HTTP endpoint that turns a message or scenario
//! plus a tone specification (named persona or ten 0–100 sliders) into an
//! LLM instruction set, dispatches it, and normalizes the output. An
//! optional advice path resolves supporting reference links from a
//! web-search backend.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod limiter;
pub mod logging;
pub mod normalize;
pub mod persona;
pub mod prompt;
pub mod providers;
pub mod server;
pub mod sources;
pub mod style;
pub mod types;
