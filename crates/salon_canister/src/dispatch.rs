//! JSON call routing for hosts that deliver entry-point calls as documents.
//!
//! A call is `{"method": "<entry point>", "args": {...}}`; the reply mirrors a
//! result variant: `{"Ok": <salon or salons>}` or `{"Err": {"kind", "message"}}`.

use crate::api::{CallContext, CanisterError, CanisterResult, EntryKind, ErrorKind, SalonCanister};
use log::debug;
use salon_core::{Clock, Salon, SalonRepository, SaloonPayload, ServiceRenderedPayload};
use serde::{Deserialize, Serialize};

/// One decoded entry-point invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args")]
pub enum CanisterCall {
    #[serde(rename = "getAllSaloons")]
    GetAllSaloons,
    #[serde(rename = "getSaloonById")]
    GetSaloonById { id: String },
    #[serde(rename = "createSaloon")]
    CreateSaloon { payload: SaloonPayload },
    #[serde(rename = "createService")]
    CreateService {
        id: String,
        payload: ServiceRenderedPayload,
    },
    #[serde(rename = "deleteSaloon")]
    DeleteSaloon { id: String },
    #[serde(rename = "rateSaloon")]
    RateSaloon { id: String, rate: f32 },
    #[serde(rename = "updateSaloonById")]
    UpdateSaloonById { id: String, payload: SaloonPayload },
}

impl CanisterCall {
    pub fn method(&self) -> &'static str {
        match self {
            Self::GetAllSaloons => "getAllSaloons",
            Self::GetSaloonById { .. } => "getSaloonById",
            Self::CreateSaloon { .. } => "createSaloon",
            Self::CreateService { .. } => "createService",
            Self::DeleteSaloon { .. } => "deleteSaloon",
            Self::RateSaloon { .. } => "rateSaloon",
            Self::UpdateSaloonById { .. } => "updateSaloonById",
        }
    }

    /// Query calls only read; every other call mutates the registry.
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::GetAllSaloons | Self::GetSaloonById { .. } => EntryKind::Query,
            Self::CreateSaloon { .. }
            | Self::CreateService { .. }
            | Self::DeleteSaloon { .. }
            | Self::RateSaloon { .. }
            | Self::UpdateSaloonById { .. } => EntryKind::Update,
        }
    }
}

/// Successful reply payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallReply {
    Salons(Vec<Salon>),
    Salon(Salon),
}

#[derive(Debug, Serialize)]
enum CallOutcome {
    Ok(CallReply),
    Err(CanisterError),
}

/// Routes one decoded call to its entry point.
pub fn dispatch<R: SalonRepository, C: Clock>(
    canister: &SalonCanister<R, C>,
    ctx: &CallContext,
    call: CanisterCall,
) -> CanisterResult<CallReply> {
    debug!(
        "event=entry_call module=canister status=start method={} kind={:?} caller={}",
        call.method(),
        call.kind(),
        ctx.caller
    );

    match call {
        CanisterCall::GetAllSaloons => canister.get_all_saloons().map(CallReply::Salons),
        CanisterCall::GetSaloonById { id } => canister.get_saloon_by_id(&id).map(CallReply::Salon),
        CanisterCall::CreateSaloon { payload } => {
            canister.create_saloon(ctx, payload).map(CallReply::Salon)
        }
        CanisterCall::CreateService { id, payload } => canister
            .create_service(ctx, &id, payload)
            .map(CallReply::Salon),
        CanisterCall::DeleteSaloon { id } => canister.delete_saloon(ctx, &id).map(CallReply::Salon),
        CanisterCall::RateSaloon { id, rate } => {
            canister.rate_saloon(ctx, &id, rate).map(CallReply::Salon)
        }
        CanisterCall::UpdateSaloonById { id, payload } => canister
            .update_saloon_by_id(ctx, &id, payload)
            .map(CallReply::Salon),
    }
}

/// Decodes, routes and encodes one JSON call. Never panics.
pub fn dispatch_json<R: SalonRepository, C: Clock>(
    canister: &SalonCanister<R, C>,
    ctx: &CallContext,
    raw_call: &str,
) -> String {
    let outcome = match serde_json::from_str::<CanisterCall>(raw_call) {
        Ok(call) => match dispatch(canister, ctx, call) {
            Ok(reply) => CallOutcome::Ok(reply),
            Err(err) => CallOutcome::Err(err),
        },
        Err(err) => CallOutcome::Err(CanisterError::new(
            ErrorKind::BadRequest,
            format!("malformed call: {err}"),
        )),
    };

    serde_json::to_string(&outcome).unwrap_or_else(|err| {
        format!(
            r#"{{"Err":{{"kind":"Storage","message":"reply encoding failed: {}"}}}}"#,
            err.to_string().replace('"', "'")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::CanisterCall;
    use crate::api::{entry_kind, EntryKind, ENTRY_POINTS};
    use salon_core::{SaloonPayload, ServiceRenderedPayload};

    #[test]
    fn decodes_unit_and_struct_calls() {
        let list: CanisterCall = serde_json::from_str(r#"{"method":"getAllSaloons"}"#).unwrap();
        assert_eq!(list, CanisterCall::GetAllSaloons);
        assert_eq!(list.kind(), EntryKind::Query);

        let rate: CanisterCall =
            serde_json::from_str(r#"{"method":"rateSaloon","args":{"id":"a","rate":4}}"#)
                .unwrap();
        assert_eq!(
            rate,
            CanisterCall::RateSaloon {
                id: "a".to_string(),
                rate: 4.0
            }
        );
        assert_eq!(rate.kind(), EntryKind::Update);
    }

    #[test]
    fn call_kinds_agree_with_entry_point_table() {
        let id = || "a".to_string();
        let calls = [
            CanisterCall::GetAllSaloons,
            CanisterCall::GetSaloonById { id: id() },
            CanisterCall::CreateSaloon {
                payload: SaloonPayload::default(),
            },
            CanisterCall::CreateService {
                id: id(),
                payload: ServiceRenderedPayload::default(),
            },
            CanisterCall::DeleteSaloon { id: id() },
            CanisterCall::RateSaloon { id: id(), rate: 1.0 },
            CanisterCall::UpdateSaloonById {
                id: id(),
                payload: SaloonPayload::default(),
            },
        ];

        for call in &calls {
            assert_eq!(entry_kind(call.method()), Some(call.kind()), "{}", call.method());
        }
        for (method, _) in ENTRY_POINTS {
            assert!(
                calls.iter().any(|call| call.method() == *method),
                "{method} has no call variant"
            );
        }
    }

    #[test]
    fn rejects_unknown_methods() {
        assert!(serde_json::from_str::<CanisterCall>(r#"{"method":"dropAll"}"#).is_err());
    }
}
