use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use inboxen::cli::{self, Cli, Invocation};
use inboxen::{Config, Database, InboxenError};

#[tokio::main]
async fn main() -> ExitCode {
    let (config_path, action) = match Cli::parse().invocation() {
        Invocation::Help(help) => {
            print!("{help}");
            return ExitCode::SUCCESS;
        }
        Invocation::Domain { config, action } => (config, action),
    };

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(InboxenError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = inboxen::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        inboxen::logging::init_console_only(&config.logging.level);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    let result = cli::run_domain(Some(action), &db, &mut stdout).await;
    db.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(InboxenError::Usage(msg)) => {
            eprintln!("{msg}");
            eprint!("{}", cli::domain_usage());
            ExitCode::from(2)
        }
        Err(e) => {
            info!("Command failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
