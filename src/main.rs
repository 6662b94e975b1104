//! heartline - an animated terminal surprise served over TCP
//!
//! Every client that connects gets a heart banner and a prompt box. Wrong
//! guesses are answered with a rotating set of hints. The secret key plays a
//! typed-out letter with a diagonal heart animation, then says goodbye.
//!
//! # Quick Start
//!
//! ```text
//! heartline                      # Listen on 0.0.0.0:2717 (telnet framing)
//! heartline -p 4000 --raw        # Plain TCP, for `stty raw -echo; nc host 4000`
//! telnet localhost 2717
//! ```
//!
//! # Client Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Submit the guess |
//! | Backspace | Erase the last character |
//! | Ctrl+C / Ctrl+D / Ctrl+X | Leave |
//! | `quit` / `exit` | Give up |

mod cli;
mod config;
mod core;
mod net;
mod ui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::config::Config;
use crate::net::Server;

/// Initialize logging; RUST_LOG wins over `level`
fn init_logging(level: &str, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("heartline={}", level)));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_thread_names(true)
                .init();
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_ref())?;

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Command line overrides the config file
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.raw {
        config.server.telnet = false;
    }

    let server = Server::bind(&config.server, config.session)?;
    let addr = server.local_addr()?;
    info!(
        "heartline {} listening on {} ({}). Connect with: telnet <server> {}",
        env!("CARGO_PKG_VERSION"),
        addr,
        if config.server.telnet { "telnet" } else { "raw" },
        addr.port()
    );

    server.run()
}
