//! permission-ledger - grant, revoke and check permissions from the command line
//! or serve them over HTTP.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use permission_ledger::config::{self, ServiceConfig};
use permission_ledger::engine;
use permission_ledger::ipc;
use permission_ledger::models::{
    GiveRequest, HasRequest, ListRequest, LoseRequest, ServiceResponse, TemplateData,
};
use permission_ledger::state::AppState;
use serde_json::Value;
use std::path::{Path, PathBuf};

const EXAMPLES_HELP: &str = r##"EXAMPLES:
    # Write a config backed by a SQLite file in the user data directory
    permission-ledger init-config

    # Serve HTTP on the configured address
    permission-ledger --config ./ledger.json serve

    # Grant a templated permission
    permission-ledger give --creator billing-svc --identity 42 --service billing \
        --permission '@admin:{user}:api.v1.admin' --data user=42

    # Check and list
    permission-ledger has --creator billing-svc --identity 42 --service billing -p read -p write
    permission-ledger list --creator billing-svc --identity 42 --service billing
"##;

#[derive(Parser)]
#[command(name = "permission-ledger")]
#[command(author, version)]
#[command(about = "Grant, revoke and check permissions per identity, service and creator")]
#[command(after_help = EXAMPLES_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured connection string
    #[arg(long, global = true)]
    connection: Option<String>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address, e.g. 127.0.0.1:47200
        #[arg(long)]
        bind: Option<String>,
    },

    /// Grant permissions (placeholders expanded from --data)
    Give {
        #[command(flatten)]
        target: Target,

        /// Template value as key=value, repeatable
        #[arg(short, long = "data", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Revoke permissions
    Lose {
        #[command(flatten)]
        target: Target,
    },

    /// Check whether all permissions are held
    Has {
        #[command(flatten)]
        target: Target,
    },

    /// List granted permissions
    List {
        #[command(flatten)]
        scope: Scope,
    },

    /// Write a config file that persists grants to SQLite
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct Scope {
    /// Issuing creator
    #[arg(long)]
    creator: String,

    /// Principal id
    #[arg(long)]
    identity: i64,

    /// Owning service name
    #[arg(long)]
    service: String,
}

#[derive(Args)]
struct Target {
    #[command(flatten)]
    scope: Scope,

    /// Permission string, repeatable
    #[arg(short, long = "permission", required = true)]
    permissions: Vec<String>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn resolve_config(explicit: Option<&Path>, connection: Option<&str>) -> Result<ServiceConfig> {
    let mut config = config::load_config(explicit).map_err(|e| anyhow!(e))?;
    if let Some(connection) = connection {
        config.connection_string = connection.to_string();
    }
    Ok(config)
}

fn print_response(response: &ServiceResponse, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(response)?
    } else {
        serde_json::to_string_pretty(response)?
    };
    println!("{}", output);
    Ok(())
}

/// Write a fresh config, using `--connection` or a SQLite file in the data dir.
fn init_config(explicit: Option<&Path>, connection: Option<String>, force: bool) -> Result<PathBuf> {
    let path = config::get_config_path(explicit).map_err(|e| anyhow!(e))?;
    if path.exists() && !force {
        return Err(anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let connection_string = match connection {
        Some(connection) => connection,
        None => config::default_file_connection().map_err(|e| anyhow!(e))?,
    };
    let config = ServiceConfig {
        connection_string,
        ..ServiceConfig::default()
    };

    config::save_config(&config, Some(&path)).map_err(|e| anyhow!(e))
}

async fn open_state(config: ServiceConfig) -> Result<AppState> {
    AppState::from_config(config)
        .await
        .context("Failed to open grant store")
}

/// Open the store for a single command, warning when its writes cannot outlive it.
async fn open_one_shot(config: ServiceConfig) -> Result<AppState> {
    if engine::is_ephemeral(&config.connection_string) {
        eprintln!(
            "note: '{}' is in-memory; grants are discarded when this command exits. \
             Run `permission-ledger init-config` or pass --connection to persist them.",
            config.connection_string
        );
    }
    open_state(config).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();
    let connection = cli.connection.as_deref();

    let response = match cli.command {
        Commands::InitConfig { force } => {
            let path = init_config(explicit, cli.connection.clone(), force)?;
            println!("Wrote config to {}", path.display());
            return Ok(());
        }
        Commands::Serve { bind } => {
            let mut config = resolve_config(explicit, connection)?;
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            let state = open_state(config).await?;
            return ipc::start(state).await.map_err(|e| anyhow!(e));
        }
        Commands::Give { target, data } => {
            let data: TemplateData = data
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            let request = GiveRequest {
                identity: target.scope.identity,
                service: target.scope.service,
                permissions: target.permissions,
                data,
            };
            let state = open_one_shot(resolve_config(explicit, connection)?).await?;
            state.service.give(&target.scope.creator, request).await
        }
        Commands::Lose { target } => {
            let request = LoseRequest {
                identity: target.scope.identity,
                service: target.scope.service,
                permissions: target.permissions,
            };
            let state = open_one_shot(resolve_config(explicit, connection)?).await?;
            state.service.lose(&target.scope.creator, request).await
        }
        Commands::Has { target } => {
            let request = HasRequest {
                identity: target.scope.identity,
                service: target.scope.service,
                permissions: target.permissions,
            };
            let state = open_one_shot(resolve_config(explicit, connection)?).await?;
            state.service.has(&target.scope.creator, request).await
        }
        Commands::List { scope } => {
            let request = ListRequest {
                identity: scope.identity,
                service: scope.service,
            };
            let state = open_one_shot(resolve_config(explicit, connection)?).await?;
            state.service.list(&scope.creator, request).await
        }
    };

    print_response(&response, cli.compact)?;

    if response.status_code >= 500 {
        std::process::exit(1);
    }
    Ok(())
}
