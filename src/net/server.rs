//! TCP listener
//!
//! Accepts connections forever and runs every client on its own OS thread,
//! so a blocking read or a long animation never stalls another client.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use super::telnet::TelnetStream;
use crate::config::{ServerConfig, SessionConfig};
use crate::core::session::Session;
use crate::core::Channel;
use crate::ui::animation::Sleeper;

/// Bound listener plus what every session needs
pub struct Server {
    listener: TcpListener,
    content: Arc<SessionConfig>,
    telnet: bool,
}

impl Server {
    /// Bind the listening socket; failure here is fatal for the process
    pub fn bind(config: &ServerConfig, content: SessionConfig) -> anyhow::Result<Self> {
        let addr = config.bind_addr();
        let listener =
            TcpListener::bind(&addr).with_context(|| format!("Failed to listen on {}", addr))?;
        Ok(Self {
            listener,
            content: Arc::new(content),
            telnet: config.telnet,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Accept loop; only returns if the listener itself goes away
    pub fn run(self) -> anyhow::Result<()> {
        let mut next_id: u64 = 1;

        for conn in self.listener.incoming() {
            let stream = match conn {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Error accepting connection: {}", e);
                    continue;
                }
            };

            let id = next_id;
            next_id += 1;

            let content = Arc::clone(&self.content);
            let telnet = self.telnet;
            let spawned = thread::Builder::new()
                .name(format!("session-{}", id))
                .spawn(move || handle_connection(stream, id, content, telnet));
            if let Err(e) = spawned {
                error!(session = id, "Failed to spawn session thread: {}", e);
            }
        }

        Ok(())
    }
}

fn handle_connection(stream: TcpStream, id: u64, content: Arc<SessionConfig>, telnet: bool) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(session = id, peer = %peer, "Client connected");

    // Typed characters should leave immediately
    if let Err(e) = stream.set_nodelay(true) {
        debug!(session = id, "Failed to set TCP_NODELAY: {}", e);
    }

    if telnet {
        match TelnetStream::negotiate(stream) {
            Ok(stream) => run_session(stream, id, content),
            Err(e) => warn!(session = id, "Telnet negotiation failed: {}", e),
        }
    } else {
        run_session(stream, id, content);
    }
}

fn run_session<S: Channel>(channel: S, id: u64, content: Arc<SessionConfig>) {
    let mut session = Session::new(channel, content, Sleeper, StdRng::from_entropy());
    match session.run() {
        Ok(outcome) => info!(
            session = id,
            outcome = ?outcome,
            last_decoy = ?session.context().last_decoy,
            "Session ended"
        ),
        Err(e) => warn!(session = id, "Session aborted: {}", e),
    }
}
