#![forbid(unsafe_code)]

//! `game-rpc-ctl`: command-line companion for the game RPC client.
//!
//! Sends a single action to the game server over TCP or a Unix domain
//! socket and prints the returned `data` as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, EnvFilter};

use game_rpc::{AppError, ClientConfig, Endpoint, ErrorKind, GameClient, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "game-rpc-ctl",
    about = "Invoke game server actions over line-delimited JSON",
    version,
    long_about = None
)]
struct Cli {
    /// TCP endpoint as `host:port` (falls back to `GAME_RPC_ADDR`).
    #[arg(long, conflicts_with_all = ["socket", "config"])]
    address: Option<String>,

    /// Unix domain socket path (falls back to `GAME_RPC_SOCKET`).
    #[arg(long, conflicts_with = "config")]
    socket: Option<PathBuf>,

    /// TOML file with `address` or `socket_path` and `timeout_ms`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-call deadline in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Invoke an action and print its result.
    Call {
        /// Action name, e.g. `list_craft`.
        action: String,
        /// Parameters as a JSON object, e.g. `'{"id": 1}'`.
        #[arg(long)]
        params: Option<String>,
    },

    /// Print the resolved endpoint.
    Endpoint,
}

impl Cli {
    /// Resolve the effective client configuration.
    ///
    /// Explicit flags win; otherwise the environment decides.
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = if let Some(ref path) = self.config {
            ClientConfig::load_from_path(path)?
        } else if let Some(ref address) = self.address {
            ClientConfig::new(Endpoint::resolve_tcp(Some(address.as_str()))?)
        } else if let Some(ref socket) = self.socket {
            ClientConfig::new(Endpoint::resolve_unix(Some(socket.as_path()))?)
        } else {
            ClientConfig::from_env()?
        };

        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("Error: {err}");
        return exit_code(&err);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to build tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            exit_code(&err)
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let client = GameClient::new(args.client_config()?)?;

    match args.command {
        Command::Endpoint => {
            println!("{}", client.address());
        }
        Command::Call { action, params } => {
            let params = params.as_deref().map(parse_params).transpose()?;
            let data = client.call(&action, params).await?;
            if data.is_null() {
                println!("OK");
            } else {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
                );
            }
        }
    }

    Ok(())
}

fn parse_params(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Config("--params must be a JSON object".into())),
        Err(err) => Err(AppError::Config(format!("invalid --params json: {err}"))),
    }
}

fn exit_code(err: &AppError) -> ExitCode {
    ExitCode::from(exit_status(err.kind()))
}

/// Distinct exit status per error kind so scripts can branch on it.
fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Application => 1,
        ErrorKind::Config => 2,
        ErrorKind::Transport => 3,
        ErrorKind::Protocol => 4,
        ErrorKind::Timeout => 5,
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
