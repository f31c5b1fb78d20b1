#![forbid(unsafe_code)]

//! Meal train runtime.
//!
//! Wraps the workflow kernel with blob-store persistence, a login-aware
//! session and the command-line surface.
//!
//! No workflow logic lives here; every state change is delegated to the
//! kernel's engine.

pub mod blob_store;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod telemetry;
