//! Configuration for heartline.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.heartline/config.toml`
//! - Built-in defaults for every value, so no file is required
//! - Validation of the session content
//!
//! # Configuration File
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 2717
//! # Negotiate character mode with telnet clients
//! telnet = true
//!
//! [session]
//! secret = "<33"
//! exit_words = ["exit", "quit"]
//! decoys = [
//!     "Interesting input! It's not the right one though.",
//!     "Hmm, not quite right!",
//! ]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Session secret must not be empty")]
    EmptySecret,

    #[error("At least one exit word is required")]
    NoExitWords,

    #[error("Decoy pool must not be empty")]
    NoDecoys,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings
    pub server: ServerConfig,
    /// Session content
    pub session: SessionConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub telnet: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2717,
            telnet: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static text a session works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Guess that unlocks the success script
    pub secret: String,
    /// Inputs that end the session
    pub exit_words: Vec<String>,
    /// Responses to a wrong guess
    pub decoys: Vec<String>,
    /// Printed under every decoy
    pub reminder: String,
    /// Printed for empty input
    pub nag: String,
    /// Last line of every session
    pub farewell: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: "<33".to_string(),
            exit_words: vec!["exit".to_string(), "quit".to_string()],
            decoys: vec![
                "That's a nice one, but try something else! I'm sure you can figure it out!".to_string(),
                "Interesting input! It's not the right one though.".to_string(),
                "Hmm, not quite right! Pay close attention to every detail today.".to_string(),
                "The key is hidden in plain sight! Look closely at something you got from someone you love!".to_string(),
            ],
            reminder: "To give up, use \"quit\".".to_string(),
            nag: "Please enter something!".to_string(),
            farewell: "\r\n\r\nSee you soon!\r\n".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn is_exit_word(&self, input: &str) -> bool {
        self.exit_words.iter().any(|w| w == input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.exit_words.is_empty() {
            return Err(ConfigError::NoExitWords);
        }
        if self.decoys.is_empty() {
            return Err(ConfigError::NoDecoys);
        }
        Ok(())
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the built-in defaults; an explicitly
    /// named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::get_config_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };
        config.session.validate()?;
        Ok(config)
    }

    /// Load and parse one file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".heartline").join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
