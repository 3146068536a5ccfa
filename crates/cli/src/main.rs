//! Line shell and terminal view for the deck builder.

mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use deckhand_cui::{open_session, LaunchOptions};
use deckhand_data::Role;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deckhand", version)]
#[command(about = "Deck builder companion for tabletop card play")]
struct Args {
    /// Directory holding the stored decks (defaults to $DECKHAND_HOME or ~/.deckhand)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Start as this role and remember it (player or gm)
    #[arg(long, value_parser = parse_role)]
    role: Option<Role>,

    /// Seed for shuffles, for repeatable sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Card catalog JSON to use instead of the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Rules JSON with per-role overrides
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Open the full-screen terminal view
    #[arg(long)]
    cui: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run one shell command and exit, e.g. `deckhand draw 3`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("unknown role '{value}' (use player or gm)"))
}

fn init_logging(args: &Args, log_dir: Option<&PathBuf>) -> Result<()> {
    let fallback = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DECKHAND_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if args.cui {
        // The full-screen view owns the terminal, so logs go to a file.
        let Some(dir) = log_dir else {
            builder.with_writer(io::sink).init();
            return Ok(());
        };
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join("deckhand.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let store_dir = args.store.clone().or_else(deckhand_cui::default_store_dir);
    init_logging(&args, store_dir.as_ref())?;

    let options = LaunchOptions {
        store_dir,
        role: args.role,
        seed: args.seed,
        catalog: args.catalog.clone(),
        rules: args.rules.clone(),
    };
    if args.cui {
        return deckhand_cui::run(options);
    }

    let mut session = open_session(&options)?;
    let mut out = io::stdout().lock();
    if !args.command.is_empty() {
        let line = args.command.join(" ");
        return shell::run_line(&mut session, &line, &mut out);
    }
    let interactive = io::stdin().is_terminal();
    shell::run_repl(&mut session, io::stdin().lock(), &mut out, interactive)
}
