//! billchain: command-line entry point to the bill ledger.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use billchain_contract::{authenticate, Invocation};
use billchain_store_lmdb::LmdbEnvironment;
use billchain_utils::LogFormat;

use crate::config::{ConfigOverrides, LedgerConfig};

#[derive(Parser)]
#[command(name = "billchain", about = "Bill lifecycle ledger")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BILLCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "BILLCHAIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in bytes.
    #[arg(long, env = "BILLCHAIN_MAP_SIZE")]
    map_size: Option<usize>,

    /// Maximum number of named LMDB databases.
    #[arg(long, env = "BILLCHAIN_MAX_DBS")]
    max_dbs: Option<u32>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BILLCHAIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BILLCHAIN_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Reject transitions the intended state diagram forbids.
    #[arg(long, env = "BILLCHAIN_STRICT_TRANSITIONS")]
    strict_transitions: Option<bool>,

    /// Keep the owner/phase composite-key history queries enabled.
    #[arg(long, env = "BILLCHAIN_LEGACY_OWNER_PHASE_QUERIES")]
    legacy_owner_phase_queries: Option<bool>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Seed the ledger with the initial bills and registry users.
    Init,

    /// Invoke a contract function with positional arguments.
    Invoke {
        /// Function name, e.g. "issueBill" or "queryBillById".
        function: String,
        args: Vec<String>,
    },

    /// Check credentials against the registry.
    Login { username: String, password: String },

    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_dir: self.data_dir.clone(),
            map_size: self.map_size,
            max_dbs: self.max_dbs,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            strict_transitions: self.strict_transitions,
            legacy_owner_phase_queries: self.legacy_owner_phase_queries,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    let config = cli.overrides().apply(base);

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    billchain_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let env = LmdbEnvironment::open(&config.data_dir, config.max_dbs, config.map_size)
        .with_context(|| format!("opening ledger at {}", config.data_dir.display()))?;
    let store = env.ledger_store();
    let dispatcher = config.dispatcher();

    match cli.command {
        Command::Init => {
            dispatcher.invoke(&store, &Invocation::InitLedger)?;
            tracing::info!("ledger initialised at {}", config.data_dir.display());
        }
        Command::Invoke { function, args } => {
            let result = dispatcher.invoke_positional(&store, &function, &args)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Login { username, password } => {
            let entry = authenticate(&store, &username, &password)?
                .ok_or_else(|| anyhow::anyhow!("invalid username or password"))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        Command::Config => {}
    }

    Ok(())
}
