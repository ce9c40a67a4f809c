//! Amigo Chat Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod relay;
pub mod store;
