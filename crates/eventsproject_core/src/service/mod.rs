//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Depend on repository traits only, never on SQLite directly.

pub mod cost_service;
pub mod event_service;
