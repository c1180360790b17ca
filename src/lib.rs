//! Match session controller for a real-time, hidden-information card game
//!
//! Turns a pulled snapshot and a pushed stream of authoritative match states
//! into one consistent, player-scoped view, decides which prompt the viewer
//! must answer, and dispatches the viewer's commands with per-family
//! in-flight guards and transient feedback.

pub mod core;
pub mod error;
pub mod loader;
pub mod service;
pub mod session;
pub mod view;

pub use error::{Result, SessionError};
