//! Server configuration.

use std::time::Duration;

use tenpercent_room::GameConfig;
use tracing::warn;

/// Everything needed to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_addr: String,
    /// Close connections that send nothing for this long. `None` keeps
    /// idle spectators connected indefinitely.
    pub idle_timeout: Option<Duration>,
    /// Capacity of the game actor's command queue.
    pub channel_size: usize,
    /// Room rules.
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", Self::DEFAULT_PORT),
            idle_timeout: None,
            channel_size: 1024,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Port used when neither `TENPERCENT_BIND` nor `PORT` is set.
    pub const DEFAULT_PORT: u16 = 8080;

    /// Reads the bind address from the environment.
    ///
    /// `TENPERCENT_BIND` (a full `host:port`) wins; otherwise `PORT` is
    /// served on all interfaces. Everything else keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(bind) = lookup("TENPERCENT_BIND").filter(|b| !b.trim().is_empty()) {
            config.bind_addr = bind.trim().to_owned();
        } else if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => config.bind_addr = format!("0.0.0.0:{port}"),
                Err(e) => warn!(%port, error = %e, "ignoring invalid PORT"),
            }
        }

        config
    }
}
