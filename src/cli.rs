//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteLedger;
use crate::domain::error::LongshotError;
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;

#[derive(Parser, Debug)]
#[command(name = "longshot", about = "Points-based binary prediction market")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Create the database schema
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Grant the admin flag to a user
    MakeAdmin {
        username: String,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Delete all trades, markets, and users
    ResetDb {
        #[arg(short, long)]
        config: PathBuf,
        /// Actually delete; without this flag nothing happens
        #[arg(long)]
        force: bool,
    },
    /// Output an argon2 hash for a password read from stdin
    HashPassword,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::InitDb { config } => run_init_db(&config),
        Command::MakeAdmin { username, config } => run_make_admin(&username, &config),
        Command::ResetDb { config, force } => run_reset_db(&config, force),
        Command::HashPassword => run_hash_password(),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LongshotError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn open_ledger(config_path: &PathBuf) -> Result<SqliteLedger, ExitCode> {
    let config = load_config(config_path)?;
    SqliteLedger::from_config(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    use crate::adapters::web::{build_router, AppState};
    use std::net::SocketAddr;
    use std::sync::Arc;

    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let ledger = match SqliteLedger::from_config(&config) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = ledger.initialize_schema() {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let addr: SocketAddr = config
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:3000".to_string())
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:3000".parse().unwrap());

    eprintln!("Starting market server on {}", addr);

    let state = AppState {
        ledger: Arc::new(ledger),
    };
    let router = build_router(state);

    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, router).await.unwrap();
    });

    ExitCode::SUCCESS
}

fn run_init_db(config_path: &PathBuf) -> ExitCode {
    let ledger = match open_ledger(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    match ledger.initialize_schema() {
        Ok(()) => {
            eprintln!("Schema ready");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_make_admin(username: &str, config_path: &PathBuf) -> ExitCode {
    let ledger = match open_ledger(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    match ledger.set_admin(username, true) {
        Ok(()) => {
            eprintln!("{username} is now an admin");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_reset_db(config_path: &PathBuf, force: bool) -> ExitCode {
    if !force {
        eprintln!("refusing to reset the database without --force");
        return ExitCode::from(1);
    }

    let ledger = match open_ledger(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    match ledger.reset() {
        Ok((trades, markets, users)) => {
            eprintln!("Deleted {trades} trades, {markets} markets, {users} users");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_hash_password() -> ExitCode {
    use crate::adapters::web::hash_password;
    use std::io::{self, BufRead};

    eprintln!("Enter password to hash:");
    let stdin = io::stdin();
    let password = stdin
        .lock()
        .lines()
        .next()
        .unwrap_or(Ok(String::new()))
        .unwrap_or_default();

    match hash_password(&password) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
