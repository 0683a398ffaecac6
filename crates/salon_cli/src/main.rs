//! Command-line host for the salon registry.
//!
//! # Responsibility
//! - Resolve config from file and flags, initialize logging and storage.
//! - Inject the caller identity and run one entry-point call.
//! - Print JSON replies on stdout and error envelopes on stderr.
//!
//! Without `--db` (or `db_path` in config) the registry lives in memory for a
//! single call, so only query entry points are accepted in that mode.

use clap::{Args, Parser, Subcommand};
use log::info;
use salon_canister::{
    dispatch, with_sqlite_canister, CallContext, CallReply, CanisterCall, CanisterError,
    CanisterResult, EntryKind, ErrorKind, SalonCanister, ENTRY_POINTS,
};
use salon_core::{
    core_version, init_logging, Clock, InMemorySalonRepository, Principal, RatingPolicy,
    RegistryConfig, SalonRepository, SalonService, SaloonPayload, ServiceRenderedPayload,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "salon-cli", version, about = "Salon registry host")]
struct Cli {
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite registry file; overrides `db_path` from config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Caller identity for this invocation.
    #[arg(long, global = true)]
    caller: Option<String>,
    #[arg(long, global = true)]
    rating_policy: Option<RatingPolicy>,
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// getAllSaloons
    List,
    /// getSaloonById
    Get { id: String },
    /// createSaloon
    Create(SaloonArgs),
    /// createService
    AddService {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        amount: f64,
    },
    /// rateSaloon
    Rate { id: String, rate: f32 },
    /// updateSaloonById
    Update {
        id: String,
        #[command(flatten)]
        saloon: SaloonArgs,
    },
    /// deleteSaloon
    Delete { id: String },
    /// Raw JSON call, e.g. `{"method":"getAllSaloons"}`.
    Call { json: String },
    /// Lists entry points with their query/update kind.
    EntryPoints,
    Version,
}

#[derive(Debug, Args)]
struct SaloonArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    location: String,
    #[arg(long, default_value = "")]
    attachment_url: String,
}

impl From<SaloonArgs> for SaloonPayload {
    fn from(value: SaloonArgs) -> Self {
        Self {
            saloon_name: value.name,
            saloon_location: value.location,
            attachment_url: value.attachment_url,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("salon_core version={}", core_version());
            return ExitCode::SUCCESS;
        }
        Command::EntryPoints => {
            for (method, kind) in ENTRY_POINTS {
                println!("{method}\t{kind:?}");
            }
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    match run(cli) {
        Ok(reply) => match serde_json::to_string_pretty(&reply) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("failed to encode reply: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            let envelope = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{envelope}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CanisterResult<CallReply> {
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(config.effective_log_level(), log_dir)
            .map_err(|err| CanisterError::new(ErrorKind::BadRequest, err.to_string()))?;
    }

    let ctx = cli
        .caller
        .map(|caller| CallContext::new(Principal::from_text(caller)))
        .unwrap_or_else(CallContext::anonymous);
    let call = to_call(cli.command)?;
    require_storage_for_writes(&config, &call)?;
    info!(
        "event=cli_call module=cli status=start method={} caller={}",
        call.method(),
        ctx.caller
    );

    match &config.db_path {
        Some(path) => with_sqlite_canister(path, config.rating_policy, |canister| {
            run_call(canister, &ctx, call)
        }),
        None => {
            let service = SalonService::new(InMemorySalonRepository::new())
                .with_rating_policy(config.rating_policy);
            run_call(&SalonCanister::new(service), &ctx, call)
        }
    }
}

fn run_call<R: SalonRepository, C: Clock>(
    canister: &SalonCanister<R, C>,
    ctx: &CallContext,
    call: CanisterCall,
) -> CanisterResult<CallReply> {
    dispatch(canister, ctx, call)
}

/// Rejects update calls that would be lost with the one-shot in-memory registry.
fn require_storage_for_writes(config: &RegistryConfig, call: &CanisterCall) -> CanisterResult<()> {
    if config.db_path.is_none() && call.kind() == EntryKind::Update {
        return Err(CanisterError::new(
            ErrorKind::BadRequest,
            format!(
                "{} needs --db or db_path: the in-memory registry is dropped after each call",
                call.method()
            ),
        ));
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> CanisterResult<RegistryConfig> {
    let mut config = match &cli.config {
        Some(path) => RegistryConfig::load(path)
            .map_err(|err| CanisterError::new(ErrorKind::BadRequest, err.to_string()))?,
        None => RegistryConfig::default(),
    };

    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(policy) = cli.rating_policy {
        config.rating_policy = policy;
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = Some(level.clone());
    }

    config
        .validate()
        .map_err(|err| CanisterError::new(ErrorKind::BadRequest, err.to_string()))?;
    Ok(config)
}

fn to_call(command: Command) -> CanisterResult<CanisterCall> {
    let call = match command {
        Command::List => CanisterCall::GetAllSaloons,
        Command::Get { id } => CanisterCall::GetSaloonById { id },
        Command::Create(saloon) => CanisterCall::CreateSaloon {
            payload: saloon.into(),
        },
        Command::AddService {
            id,
            name,
            description,
            amount,
        } => CanisterCall::CreateService {
            id,
            payload: ServiceRenderedPayload {
                service_name: name,
                service_description: description,
                service_amount: amount,
            },
        },
        Command::Rate { id, rate } => CanisterCall::RateSaloon { id, rate },
        Command::Update { id, saloon } => CanisterCall::UpdateSaloonById {
            id,
            payload: saloon.into(),
        },
        Command::Delete { id } => CanisterCall::DeleteSaloon { id },
        Command::Call { json } => serde_json::from_str(&json).map_err(|err| {
            CanisterError::new(ErrorKind::BadRequest, format!("malformed call: {err}"))
        })?,
        Command::EntryPoints | Command::Version => {
            return Err(CanisterError::new(
                ErrorKind::BadRequest,
                "command does not map to an entry point",
            ))
        }
    };
    Ok(call)
}
