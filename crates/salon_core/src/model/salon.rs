//! Salon domain model.
//!
//! # Responsibility
//! - Define the salon record and the service sub-records it owns.
//! - Provide mutation helpers that keep `updated_at` bookkeeping consistent.
//!
//! # Invariants
//! - `id`, `owner` and `created_at` never change after construction.
//! - `rating` starts at [`INITIAL_RATING`] and is changed only by rating.
//! - `updated_at` stays `None` until the first mutation.
//! - `services_rendered` is append-only.

use crate::model::principal::Principal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a salon record (UUID v4 text).
pub type SalonId = String;

/// Rating assigned to every newly created salon.
pub const INITIAL_RATING: f32 = 1.0;

/// Mutable text fields of a salon, as submitted by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaloonPayload {
    pub saloon_name: String,
    pub saloon_location: String,
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
}

/// Fields of one service offering, as submitted by the owner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRenderedPayload {
    pub service_name: String,
    pub service_description: String,
    pub service_amount: f64,
}

/// One service offering owned by exactly one salon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRendered {
    pub id: String,
    pub service_name: String,
    pub service_description: String,
    /// Price in the salon's currency.
    pub service_amount: f64,
    /// Unix epoch nanoseconds.
    pub created_at: u64,
}

impl ServiceRendered {
    /// Creates a service record with a generated id.
    pub fn new(payload: ServiceRenderedPayload, created_at: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            service_name: payload.service_name,
            service_description: payload.service_description,
            service_amount: payload.service_amount,
            created_at,
        }
    }
}

/// Canonical salon record persisted in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salon {
    pub id: SalonId,
    /// Principal that created the salon; the only identity allowed to modify it.
    pub owner: Principal,
    pub saloon_name: String,
    pub saloon_location: String,
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
    pub services_rendered: Vec<ServiceRendered>,
    /// Unbounded aggregate; see `RatingPolicy` for how it moves.
    pub rating: f32,
    /// Unix epoch nanoseconds.
    pub created_at: u64,
    /// Unix epoch nanoseconds of the latest mutation.
    pub updated_at: Option<u64>,
}

impl Salon {
    /// Creates a new salon with a generated id.
    pub fn new(owner: Principal, payload: SaloonPayload, created_at: u64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), owner, payload, created_at)
    }

    /// Creates a new salon with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: impl Into<SalonId>,
        owner: Principal,
        payload: SaloonPayload,
        created_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            owner,
            saloon_name: payload.saloon_name,
            saloon_location: payload.saloon_location,
            attachment_url: payload.attachment_url,
            services_rendered: Vec::new(),
            rating: INITIAL_RATING,
            created_at,
            updated_at: None,
        }
    }

    /// Returns whether `caller` owns this salon.
    pub fn is_owned_by(&self, caller: &Principal) -> bool {
        self.owner.equals(caller)
    }

    /// Replaces the three mutable text fields.
    pub fn apply_payload(&mut self, payload: SaloonPayload, now: u64) {
        self.saloon_name = payload.saloon_name;
        self.saloon_location = payload.saloon_location;
        self.attachment_url = payload.attachment_url;
        self.touch(now);
    }

    /// Appends one service record and returns a reference to it.
    pub fn push_service(&mut self, payload: ServiceRenderedPayload, now: u64) -> &ServiceRendered {
        self.services_rendered.push(ServiceRendered::new(payload, now));
        self.touch(now);
        &self.services_rendered[self.services_rendered.len() - 1]
    }

    /// Stores a freshly computed rating.
    pub fn set_rating(&mut self, rating: f32, now: u64) {
        self.rating = rating;
        self.touch(now);
    }

    fn touch(&mut self, now: u64) {
        self.updated_at = Some(now);
    }
}
