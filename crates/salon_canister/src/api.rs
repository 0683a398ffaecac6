//! Entry-point API for the salon registry host.
//!
//! # Responsibility
//! - Expose the registry as named query/update entry points.
//! - Thread the host-supplied caller identity into every call.
//! - Map core errors to a stable wire envelope.
//!
//! # Invariants
//! - Entry points never panic; every failure is a `CanisterError`.
//! - Query entry points never mutate storage.

use log::warn;
use salon_core::db::open_db;
use salon_core::{
    Clock, Principal, RatingPolicy, Salon, SalonRepository, SalonService,
    SalonServiceError, SaloonPayload, ServiceRenderedPayload, SqliteSalonRepository, SystemClock,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Read/write classification of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Query,
    Update,
}

/// Every entry point exposed by the canister with its classification.
pub const ENTRY_POINTS: &[(&str, EntryKind)] = &[
    ("getAllSaloons", EntryKind::Query),
    ("getSaloonById", EntryKind::Query),
    ("createSaloon", EntryKind::Update),
    ("createService", EntryKind::Update),
    ("deleteSaloon", EntryKind::Update),
    ("rateSaloon", EntryKind::Update),
    ("updateSaloonById", EntryKind::Update),
];

/// Looks up the classification of a named entry point.
pub fn entry_kind(method: &str) -> Option<EntryKind> {
    ENTRY_POINTS
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, kind)| *kind)
}

/// Per-call context supplied by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
}

impl CallContext {
    pub fn new(caller: Principal) -> Self {
        Self { caller }
    }

    pub fn anonymous() -> Self {
        Self::new(Principal::anonymous())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Storage,
    BadRequest,
}

/// Error envelope returned across the entry-point boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanisterError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CanisterError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for CanisterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for CanisterError {}

impl From<SalonServiceError> for CanisterError {
    fn from(value: SalonServiceError) -> Self {
        let kind = match &value {
            SalonServiceError::NotFound(_) => ErrorKind::NotFound,
            SalonServiceError::Forbidden { .. } => ErrorKind::Forbidden,
            SalonServiceError::InvalidInput { .. } => ErrorKind::BadRequest,
            SalonServiceError::Repo(_) => ErrorKind::Storage,
        };
        Self::new(kind, value.to_string())
    }
}

impl From<salon_core::RepoError> for CanisterError {
    fn from(value: salon_core::RepoError) -> Self {
        Self::new(ErrorKind::Storage, value.to_string())
    }
}

pub type CanisterResult<T> = Result<T, CanisterError>;

/// Registry exposed through the seven named entry points.
pub struct SalonCanister<R: SalonRepository, C: Clock = SystemClock> {
    service: SalonService<R, C>,
}

impl<R: SalonRepository, C: Clock> SalonCanister<R, C> {
    pub fn new(service: SalonService<R, C>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &SalonService<R, C> {
        &self.service
    }

    /// `getAllSaloons` (query).
    pub fn get_all_saloons(&self) -> CanisterResult<Vec<Salon>> {
        Ok(self.service.list_salons()?)
    }

    /// `getSaloonById` (query).
    pub fn get_saloon_by_id(&self, id: &str) -> CanisterResult<Salon> {
        Ok(self.service.get_salon(id)?)
    }

    /// `createSaloon` (update).
    pub fn create_saloon(&self, ctx: &CallContext, payload: SaloonPayload) -> CanisterResult<Salon> {
        self.log_failure("createSaloon", self.service.create_salon(&ctx.caller, payload))
    }

    /// `createService` (update, owner only).
    pub fn create_service(
        &self,
        ctx: &CallContext,
        salon_id: &str,
        payload: ServiceRenderedPayload,
    ) -> CanisterResult<Salon> {
        self.log_failure(
            "createService",
            self.service.add_service(&ctx.caller, salon_id, payload),
        )
    }

    /// `deleteSaloon` (update, owner only).
    pub fn delete_saloon(&self, ctx: &CallContext, id: &str) -> CanisterResult<Salon> {
        self.log_failure("deleteSaloon", self.service.delete_salon(&ctx.caller, id))
    }

    /// `rateSaloon` (update, any caller).
    pub fn rate_saloon(&self, _ctx: &CallContext, id: &str, rate: f32) -> CanisterResult<Salon> {
        self.log_failure("rateSaloon", self.service.rate_salon(id, rate))
    }

    /// `updateSaloonById` (update, owner only).
    pub fn update_saloon_by_id(
        &self,
        ctx: &CallContext,
        id: &str,
        payload: SaloonPayload,
    ) -> CanisterResult<Salon> {
        self.log_failure(
            "updateSaloonById",
            self.service.update_salon(&ctx.caller, id, payload),
        )
    }

    fn log_failure<T>(
        &self,
        method: &'static str,
        result: Result<T, SalonServiceError>,
    ) -> CanisterResult<T> {
        result.map_err(|err| {
            warn!(
                "event=entry_call module=canister status=error method={method} error_code={}",
                err.code()
            );
            CanisterError::from(err)
        })
    }
}

/// Opens the SQLite registry at `db_path` and runs `f` against a canister on it.
///
/// The connection lives only for the duration of `f`.
pub fn with_sqlite_canister<T>(
    db_path: impl AsRef<Path>,
    rating_policy: RatingPolicy,
    f: impl FnOnce(&SalonCanister<SqliteSalonRepository<'_>>) -> CanisterResult<T>,
) -> CanisterResult<T> {
    let conn = open_db(db_path).map_err(|err| {
        CanisterError::new(ErrorKind::Storage, format!("registry DB open failed: {err}"))
    })?;
    let repo = SqliteSalonRepository::try_new(&conn)?;
    let canister = SalonCanister::new(SalonService::new(repo).with_rating_policy(rating_policy));
    f(&canister)
}
