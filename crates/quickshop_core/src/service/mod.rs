//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep callers (HTTP layers, tooling) decoupled from storage details.

pub mod list_admin;
pub mod membership;
