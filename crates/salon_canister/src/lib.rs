//! Entry-point surface of the salon registry.
//!
//! Hosts construct a [`SalonCanister`] over any salon repository and invoke
//! its entry points with a [`CallContext`] carrying the caller identity.

pub mod api;
pub mod dispatch;

pub use api::{
    entry_kind, with_sqlite_canister, CallContext, CanisterError, CanisterResult, EntryKind,
    ErrorKind, SalonCanister, ENTRY_POINTS,
};
pub use dispatch::{dispatch, dispatch_json, CallReply, CanisterCall};
