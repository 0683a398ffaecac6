//! Registry use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the registry operations.
//! - Keep host layers decoupled from storage details.

pub mod clock;
pub mod rating;
pub mod salon_service;
