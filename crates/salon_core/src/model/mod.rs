//! Domain model for the salon registry.
//!
//! # Responsibility
//! - Define canonical records stored by the registry and their payloads.
//! - Define the opaque caller identity used for ownership checks.
//!
//! # Invariants
//! - Every salon is identified by a stable, never reused text id.
//! - Service records have no lifecycle outside their owning salon.

pub mod principal;
pub mod salon;
