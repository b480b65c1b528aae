//! Parley: LLM-backed conversational agents on the command line.
//!
//! Usage:
//!   parley support                 # GizmoTron 5000 support desk
//!   parley scribe                  # medical scribe, transcripts to EHR entries
//!   parley records                 # print every stored record
//!   parley --config parley.toml --store records.json scribe

mod config;

use std::{io, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use parley_contracts::error::ParleyResult;
use parley_core::{traits::RecordStore, Conversation, ExtractionAgent, Vertical};
use parley_llm::GeminiClient;
use parley_parse::SchemaParser;
use parley_store::JsonFileRecordStore;
use parley_verticals::{MedicalScribe, SupportDesk};

use crate::config::{api_key_from_env, AppConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Parley: schema-constrained conversational agents.
#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "LLM-backed support desk and medical scribe",
    long_about = "Runs a line-oriented conversation in which a hosted language model turns\n\
                  free text into schema-checked JSON that drives domain actions."
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Record store file, overriding `[store] path`.
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chat with the GizmoTron 5000 support desk.
    Support,
    /// Turn doctor/patient transcripts into stored EHR entries.
    Scribe,
    /// Print all stored records as JSON.
    Records,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Logs go to stderr so they never interleave with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("parley: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> ParleyResult<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.store {
        config.store.path = path;
    }
    debug!(?config, "configuration resolved");

    let store: Arc<dyn RecordStore> = Arc::new(JsonFileRecordStore::new(&config.store.path));

    match cli.command {
        Command::Support => run_session(SupportDesk::new(build_agent(&config)?, store)),
        Command::Scribe => run_session(MedicalScribe::new(build_agent(&config)?, store)),
        Command::Records => print_records(store.as_ref()),
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn build_agent(config: &AppConfig) -> ParleyResult<ExtractionAgent> {
    let client = GeminiClient::new(api_key_from_env()?, config.gemini_settings())?;
    Ok(
        ExtractionAgent::new(Box::new(client), Box::new(SchemaParser::new()))
            .with_max_retries(config.extraction.max_retries),
    )
}

fn run_session<V: Vertical>(vertical: V) -> ParleyResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Conversation::new(vertical, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}

fn print_records(store: &dyn RecordStore) -> ParleyResult<()> {
    let records = store.list_all()?;
    let json = serde_json::to_string_pretty(&records).map_err(io::Error::from)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["parley", "records", "--store", "r.json"]).unwrap();
        assert!(matches!(cli.command, Command::Records));
        assert_eq!(cli.store, Some(PathBuf::from("r.json")));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_config_before_subcommand() {
        let cli = Cli::try_parse_from(["parley", "--config", "p.toml", "scribe"]).unwrap();
        assert!(matches!(cli.command, Command::Scribe));
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["parley"]).is_err());
    }
}
