//! Salon registry use-case service.
//!
//! # Responsibility
//! - Implement the registry operations over an injected ordered map.
//! - Enforce ownership on owner-only writes.
//!
//! # Invariants
//! - A rejected write (not found, forbidden or invalid input) never touches
//!   storage.
//! - `rating` is only changed by `rate_salon`.
//! - Every successful mutation sets `updated_at` from the injected clock.
//! - Payload text is stored as submitted, without validation.
//! - Ratings and service amounts are always finite; a write that would store
//!   a non-finite number is rejected as `InvalidInput`.

use crate::model::principal::Principal;
use crate::model::salon::{Salon, SalonId, SaloonPayload, ServiceRenderedPayload};
use crate::repo::salon_repo::{RepoError, RepoResult, SalonRepository};
use crate::service::clock::{Clock, SystemClock};
use crate::service::rating::RatingPolicy;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for registry use-cases.
#[derive(Debug)]
pub enum SalonServiceError {
    /// No salon is stored under the requested id.
    NotFound(SalonId),
    /// Caller is not the owner of the target salon.
    Forbidden { salon_id: SalonId, caller: Principal },
    /// Numeric input that cannot be stored (NaN, infinite, or a rating that
    /// would become non-finite).
    InvalidInput { salon_id: SalonId, reason: String },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl SalonServiceError {
    /// Stable machine-readable code used in logs and wire envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Repo(_) => "storage",
        }
    }
}

impl Display for SalonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "The saloon with id={id} is not found"),
            Self::Forbidden { .. } => write!(f, "You are not the owner of this saloon"),
            Self::InvalidInput { salon_id, reason } => {
                write!(f, "Invalid input for saloon with id={salon_id}: {reason}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SalonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SalonServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, SalonServiceError>;

/// Registry facade over one injected salon map.
pub struct SalonService<R: SalonRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    rating_policy: RatingPolicy,
}

impl<R: SalonRepository> SalonService<R> {
    /// Creates a service on wall-clock time with the default rating policy.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: SalonRepository, C: Clock> SalonService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self {
            repo,
            clock,
            rating_policy: RatingPolicy::default(),
        }
    }

    /// Replaces the rating formula.
    pub fn with_rating_policy(mut self, rating_policy: RatingPolicy) -> Self {
        self.rating_policy = rating_policy;
        self
    }

    pub fn rating_policy(&self) -> RatingPolicy {
        self.rating_policy
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists every stored salon in map order.
    pub fn list_salons(&self) -> RepoResult<Vec<Salon>> {
        self.repo.list_salons()
    }

    /// Gets one salon by id.
    pub fn get_salon(&self, id: &str) -> ServiceResult<Salon> {
        self.repo
            .get_salon(id)?
            .ok_or_else(|| SalonServiceError::NotFound(id.to_string()))
    }

    /// Creates a salon owned by `caller`.
    pub fn create_salon(&self, caller: &Principal, payload: SaloonPayload) -> ServiceResult<Salon> {
        let salon = Salon::new(caller.clone(), payload, self.clock.now_nanos());
        self.repo.insert_salon(&salon)?;

        info!(
            "event=salon_create module=service status=ok salon_id={} owner={}",
            salon.id, salon.owner
        );
        Ok(salon)
    }

    /// Appends one service offering to a salon owned by `caller`.
    pub fn add_service(
        &self,
        caller: &Principal,
        salon_id: &str,
        payload: ServiceRenderedPayload,
    ) -> ServiceResult<Salon> {
        let mut salon = self.owned_salon("salon_add_service", caller, salon_id)?;
        if !payload.service_amount.is_finite() {
            return Err(self.reject_input(
                "salon_add_service",
                salon_id,
                format!("serviceAmount must be finite, got {}", payload.service_amount),
            ));
        }
        let service_id = salon
            .push_service(payload, self.clock.now_nanos())
            .id
            .clone();
        self.repo.insert_salon(&salon)?;

        info!(
            "event=salon_add_service module=service status=ok salon_id={} service_id={} services={}",
            salon.id,
            service_id,
            salon.services_rendered.len()
        );
        Ok(salon)
    }

    /// Folds `rate` into the stored rating.
    ///
    /// Open to every caller; rating is public feedback.
    pub fn rate_salon(&self, salon_id: &str, rate: f32) -> ServiceResult<Salon> {
        let mut salon = self.get_salon(salon_id)?;
        let previous = salon.rating;
        let next = self
            .rating_policy
            .try_apply(previous, rate)
            .ok_or_else(|| {
                self.reject_input(
                    "salon_rate",
                    salon_id,
                    format!(
                        "rate {rate} cannot be folded into rating {previous} with {}",
                        self.rating_policy
                    ),
                )
            })?;
        salon.set_rating(next, self.clock.now_nanos());
        self.repo.insert_salon(&salon)?;

        info!(
            "event=salon_rate module=service status=ok salon_id={} policy={} previous={} rating={}",
            salon.id, self.rating_policy, previous, next
        );
        Ok(salon)
    }

    /// Replaces the mutable text fields of a salon owned by `caller`.
    pub fn update_salon(
        &self,
        caller: &Principal,
        salon_id: &str,
        payload: SaloonPayload,
    ) -> ServiceResult<Salon> {
        let mut salon = self.owned_salon("salon_update", caller, salon_id)?;
        salon.apply_payload(payload, self.clock.now_nanos());
        self.repo.insert_salon(&salon)?;

        info!(
            "event=salon_update module=service status=ok salon_id={}",
            salon.id
        );
        Ok(salon)
    }

    /// Removes a salon owned by `caller` and returns it.
    pub fn delete_salon(&self, caller: &Principal, salon_id: &str) -> ServiceResult<Salon> {
        self.owned_salon("salon_delete", caller, salon_id)?;
        let removed = self
            .repo
            .remove_salon(salon_id)?
            .ok_or_else(|| SalonServiceError::NotFound(salon_id.to_string()))?;

        info!(
            "event=salon_delete module=service status=ok salon_id={} services={}",
            removed.id,
            removed.services_rendered.len()
        );
        Ok(removed)
    }

    fn reject_input(
        &self,
        event: &'static str,
        salon_id: &str,
        reason: String,
    ) -> SalonServiceError {
        warn!(
            "event={event} module=service status=error error_code=invalid_input salon_id={salon_id}"
        );
        SalonServiceError::InvalidInput {
            salon_id: salon_id.to_string(),
            reason,
        }
    }

    fn owned_salon(
        &self,
        event: &'static str,
        caller: &Principal,
        salon_id: &str,
    ) -> ServiceResult<Salon> {
        let salon = self.get_salon(salon_id).map_err(|err| {
            warn!(
                "event={event} module=service status=error error_code={} salon_id={salon_id}",
                err.code()
            );
            err
        })?;

        if !salon.is_owned_by(caller) {
            warn!(
                "event={event} module=service status=error error_code=forbidden salon_id={salon_id} caller={caller}"
            );
            return Err(SalonServiceError::Forbidden {
                salon_id: salon.id,
                caller: caller.clone(),
            });
        }

        Ok(salon)
    }
}
