use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use outbreak_console::commands::{CommandTable, Dispatcher, Reply};
use outbreak_console::config::ConsoleConfig;
use outbreak_console::logging::init_logging;
use outbreak_core::AppInfo;
use outbreak_core::game::serialization::SessionSnapshot;
use outbreak_core::game::session::Session;
use outbreak_core::game::setup::GameSetup;

/// Table-side tracker for cooperative outbreak board games.
#[derive(Debug, Parser)]
#[command(name = "outbreak", author, version, about = "Outbreak session tracker and odds console")]
struct Cli {
    /// Path to an optional YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Start a new session from a setup file.
    Start {
        /// JSON setup describing locations, players and events.
        #[arg(long, value_name = "FILE")]
        setup: PathBuf,

        /// Session name; saves are grouped under it.
        #[arg(long, value_name = "NAME")]
        name: String,

        /// Seed for the discovery deck shuffle.
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// Resume a session from a saved snapshot.
    Load {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match cli.config.as_ref() {
        Some(path) => ConsoleConfig::from_path(path)?,
        None => ConsoleConfig::default(),
    };
    let _logging_guard = init_logging(&config.logging)?;

    let session = match cli.command {
        Mode::Start { setup, name, seed } => {
            let json = fs::read_to_string(&setup)
                .with_context(|| format!("reading setup file {}", setup.display()))?;
            let setup_record = GameSetup::from_json(&json)
                .with_context(|| format!("parsing setup file {}", setup.display()))?;
            let seed = seed.unwrap_or_else(rand::random);
            Session::new(&setup_record, name, seed).context("building session")?
        }
        Mode::Load { file } => SessionSnapshot::load(&file)
            .with_context(|| format!("loading snapshot {}", file.display()))?,
    };

    info!(
        app = AppInfo::name(),
        version = AppInfo::version(),
        session = session.name(),
        "console ready"
    );
    println!(
        "{} {} - session '{}' ({} locations, {} players). Type 'help' for commands.",
        AppInfo::name(),
        AppInfo::version(),
        session.name(),
        session.locations().len(),
        session.turns().players().len()
    );

    let table = CommandTable::standard();
    let mut console = Dispatcher::new(
        &table,
        session,
        config.save_dir(),
        config.forecast.urgent_limit,
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("reading command")?;
        match console.execute(&line) {
            Ok(Some(Reply::Quit)) => {
                println!("{}", Reply::Quit);
                break;
            }
            Ok(Some(reply)) => println!("{reply}"),
            Ok(None) => {}
            Err(err) => {
                warn!(command = line.trim(), error = %err, "command failed");
                println!("error: {err}");
            }
        }
        stdout.flush().context("flushing console output")?;
    }
    Ok(())
}
