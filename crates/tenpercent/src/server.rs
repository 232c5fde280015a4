//! `TenPercentServer` builder and accept loop.
//!
//! Ties the layers together: the WebSocket transport accepts
//! connections, each gets a handler task, and every handler talks to
//! the one game actor.

use std::sync::Arc;
use std::time::Duration;

use tenpercent_protocol::JsonCodec;
use tenpercent_room::{GameConfig, GameHandle, LoserSelector, UniformSelector, spawn_game};
use tenpercent_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ServerConfig, TenPercentError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) game: GameHandle,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting a TenPercent server.
///
/// # Example
///
/// ```rust,no_run
/// use tenpercent::prelude::*;
///
/// # async fn start() -> Result<(), TenPercentError> {
/// let server = TenPercentServer::builder()
///     .bind("0.0.0.0:8080")
///     .game_config(GameConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TenPercentServerBuilder {
    config: ServerConfig,
    selector: Option<Box<dyn LoserSelector>>,
}

impl TenPercentServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            config,
            selector: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the room rules.
    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    /// Closes connections that stay silent for `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Replaces the OS-seeded uniform loser selection.
    pub fn selector(mut self, selector: impl LoserSelector) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    /// Binds the listener and spawns the game actor.
    pub async fn build(self) -> Result<TenPercentServer, TenPercentError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let selector = self
            .selector
            .unwrap_or_else(|| Box::new(UniformSelector::from_os_rng()));
        let game = spawn_game(self.config.game, selector, self.config.channel_size);

        let state = Arc::new(ServerState {
            game,
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(TenPercentServer { transport, state })
    }
}

impl Default for TenPercentServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound TenPercent server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TenPercentServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TenPercentServer {
    /// Creates a new builder.
    pub fn builder() -> TenPercentServerBuilder {
        TenPercentServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle to the game actor, for inspection.
    pub fn game(&self) -> GameHandle {
        self.state.game.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each connection. A failed accept (for
    /// example a botched WebSocket upgrade) is logged and skipped. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), TenPercentError> {
        tracing::info!("TenPercent server accepting connections");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
