use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use multiseek_search::{Selection, shared_preferences};

mod app;
mod commands;
mod config;
mod document;
mod session;
mod status;

use app::App;
use config::PreferenceStore;
use document::Document;
use session::SearchController;

#[derive(Parser)]
#[command(name = "multiseek")]
#[command(about = "Multi-cursor incremental search over a text file", long_about = None)]
#[command(version)]
struct Cli {
    /// File to search
    file: PathBuf,

    /// Initial selection, as LINE:COL or LINE:COL-LINE:COL (zero-based, repeatable)
    #[arg(long = "cursor", value_name = "SELECTION", value_parser = commands::parse_selection)]
    cursors: Vec<Selection>,

    /// Read commands from this file instead of standard input
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Preference file to use instead of the one in the config directory
    #[arg(long, value_name = "PATH")]
    preferences: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = match cli.preferences {
        Some(path) => PreferenceStore::new(Some(path)),
        None => PreferenceStore::default_location(),
    };
    if let Some(path) = store.path() {
        info!("search preferences: {}", path.display());
    }
    let preferences = shared_preferences(store.load());

    let (events_tx, events_rx) = flume::unbounded();
    let mut document = Document::open(&cli.file, events_tx)?;
    if !cli.cursors.is_empty() {
        document.select(cli.cursors);
    }

    let controller = SearchController::new(preferences, store, events_rx);
    let mut app = App::new(document, controller);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.script {
        Some(path) => {
            let script =
                File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            app.run(BufReader::new(script), &mut out, false)
        }
        None => app.run(io::stdin().lock(), &mut out, true),
    }
}
