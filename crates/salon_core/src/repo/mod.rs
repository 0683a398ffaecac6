//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the ordered-map contract the salon registry is injected with.
//! - Isolate SQLite and JSON encoding details from service orchestration.
//!
//! # Invariants
//! - Repository APIs report storage failures only; missing ids are `Ok(None)`.

pub mod salon_repo;
