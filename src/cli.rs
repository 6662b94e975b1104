//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

/// Serve the heartline experience to terminal clients
#[derive(Parser, Debug)]
#[command(name = "heartline")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, env = "HEARTLINE_HOST", value_name = "ADDR")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "HEARTLINE_PORT")]
    pub port: Option<u16>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "HEARTLINE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Plain TCP without telnet negotiation
    #[arg(long)]
    pub raw: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "HEARTLINE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "HEARTLINE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
