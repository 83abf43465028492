//! Command line interface for Inboxen.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::admin::DomainAdminService;
use crate::db::Database;
use crate::Result;

#[derive(Parser, Debug)]
#[command(name = "inboxen")]
#[command(about = "Inboxen administration")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage domains
    Domain(DomainArgs),
}

#[derive(Args, Debug)]
pub struct DomainArgs {
    #[command(subcommand)]
    pub action: Option<DomainAction>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DomainAction {
    /// Add a domain and its support inbox
    Add {
        /// Domain name, e.g. example.com
        domain: String,
    },
    /// List all domains
    List,
    /// Remove a domain and every inbox under it
    #[command(visible_alias = "rm")]
    Remove {
        /// Domain name to remove
        domain: String,
    },
}

/// What a parsed command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Print this help text and exit; nothing is opened.
    Help(String),
    /// Run a domain action against the configured database.
    Domain {
        config: PathBuf,
        action: DomainAction,
    },
}

impl Cli {
    /// Resolve a missing verb to help text.
    pub fn invocation(self) -> Invocation {
        match self.command {
            None => Invocation::Help(usage()),
            Some(Commands::Domain(DomainArgs { action: None })) => {
                Invocation::Help(domain_usage())
            }
            Some(Commands::Domain(DomainArgs {
                action: Some(action),
            })) => Invocation::Domain {
                config: self.config,
                action,
            },
        }
    }
}

/// Help text of the top-level command.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Help text of the `domain` command.
pub fn domain_usage() -> String {
    let mut command = Cli::command();
    command
        .find_subcommand_mut("domain")
        .map(|domain| domain.render_help().to_string())
        .unwrap_or_default()
}

/// Run a `domain` action, writing its output to `out`.
///
/// Without an action the `domain` help text is written.
pub async fn run_domain<W: Write>(
    action: Option<DomainAction>,
    db: &Database,
    out: &mut W,
) -> Result<()> {
    let service = DomainAdminService::new(db);

    match action {
        None => {
            write!(out, "{}", domain_usage())?;
        }
        Some(DomainAction::Add { domain }) => {
            let (domain, _) = service.add(&domain).await?;
            writeln!(out, "{domain} has been added")?;
        }
        Some(DomainAction::List) => {
            service.list(&mut *out).await?;
        }
        Some(DomainAction::Remove { domain }) => {
            if service.remove(&domain).await? > 0 {
                writeln!(out, "{domain} has been removed")?;
            } else {
                writeln!(out, "{domain} does not exist, nothing removed")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}
