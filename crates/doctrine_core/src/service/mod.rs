//! Core use-case services.
//!
//! # Responsibility
//! - Wrap the registry for callers that share it across threads.
//! - Keep UI/persistence layers decoupled from registry internals.

pub mod registry_service;
