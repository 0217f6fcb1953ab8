//! Entry point for the folio reader shell.
//!
//! - Parse command-line arguments.
//! - Load user configuration (default `conf/config.toml`).
//! - Upload any PDFs named on the command line.
//! - Hand stdin/stdout to the interactive shell.

mod output;
mod shell;

use crate::shell::Shell;
use anyhow::{Context, Result, anyhow};
use folio_core::config::{DEFAULT_CONFIG_PATH, load_config};
use folio_core::{GoogleTranslateTts, PdfLibrary, Reader};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config_path: Option<PathBuf>,
    books: Vec<PathBuf>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config_path = args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config(&config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        config = %config_path.display(),
        level = %config.log_level,
        books = args.books.len(),
        "Starting folio reader"
    );
    info!(
        language = %config.tts_language,
        speed = %config.tts_speed,
        tld = %config.tts_tld,
        audio_dir = %config.audio_dir,
        download_dir = %config.download_dir,
        "Active configuration"
    );

    let synthesizer =
        GoogleTranslateTts::from_config(&config).context("Failed to set up text-to-speech")?;
    let reader = Reader::new(Box::new(PdfLibrary::new()), Box::new(synthesizer), &config);
    let mut shell = Shell::new(reader, &config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if !args.books.is_empty() {
        shell.open(&args.books, &mut stdout)?;
    }
    shell.run(stdin.lock(), stdout)
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("Usage: folio-reader [--config PATH] [PDF ...]"))?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                return Err(anyhow!("Usage: folio-reader [--config PATH] [PDF ...]"));
            }
            _ => {
                let path = PathBuf::from(arg);
                if !path.exists() {
                    return Err(anyhow!("File not found: {}", path.display()));
                }
                parsed.books.push(path);
            }
        }
    }
    Ok(parsed)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!("RUST_LOG is set; ignoring config log level");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
