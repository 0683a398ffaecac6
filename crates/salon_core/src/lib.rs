//! Core domain logic for the salon registry.
//! This crate is the single source of truth for registry invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RegistryConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::principal::Principal;
pub use model::salon::{
    Salon, SalonId, SaloonPayload, ServiceRendered, ServiceRenderedPayload, INITIAL_RATING,
};
pub use repo::salon_repo::{
    InMemorySalonRepository, RepoError, RepoResult, SalonRepository, SqliteSalonRepository,
};
pub use service::clock::{Clock, ManualClock, SystemClock};
pub use service::rating::{RatingPolicy, UnknownRatingPolicy};
pub use service::salon_service::{SalonService, SalonServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
