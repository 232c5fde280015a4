//! The game actor: one Tokio task that owns the [`Lobby`].
//!
//! Connection handlers talk to it through a cloneable [`GameHandle`].
//! Every counting-down room has a ticker task with its own
//! [`TickScheduler`], started when the countdown starts, so each room
//! keeps its own cadence. Intents and ticks are handled one at a time
//! inside a `select!` loop, so no two room mutations ever overlap.

use std::collections::HashMap;
use std::time::Duration;

use tenpercent_protocol::{ClientIntent, PlayerId, Recipient, RoomId, ServerEvent};
use tenpercent_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{Dispatch, GameConfig, Lobby, LoserSelector, Room, RoomError, RoomPhase};

/// Channel sender for delivering events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to the game actor through its channel.
pub(crate) enum GameCommand {
    /// Register the outbound channel for a new connection.
    Connect {
        player_id: PlayerId,
        sender: PlayerSender,
    },

    /// A decoded intent from a player.
    Intent {
        player_id: PlayerId,
        intent: ClientIntent,
    },

    /// The player's connection closed.
    Disconnect { player_id: PlayerId },

    /// Request room metadata.
    Inspect {
        room_id: RoomId,
        reply: oneshot::Sender<Option<RoomInfo>>,
    },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: RoomPhase,
    pub player_count: usize,
    pub round_counter: u64,
    /// Duration the next countdown starts from.
    pub round_timer_secs: f64,
    /// Seconds left, while counting down.
    pub countdown_remaining: Option<f64>,
}

impl From<&Room> for RoomInfo {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id().clone(),
            phase: room.phase(),
            player_count: room.player_count(),
            round_counter: room.round_counter(),
            round_timer_secs: room.round_timer_secs(),
            countdown_remaining: room.countdown_remaining(),
        }
    }
}

/// Handle to the running game actor.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    /// Registers `player_id`; events for them go to `sender`.
    pub async fn connect(&self, player_id: PlayerId, sender: PlayerSender) -> Result<(), RoomError> {
        self.send(GameCommand::Connect { player_id, sender }).await
    }

    /// Forwards an intent (fire-and-forget).
    pub async fn send_intent(&self, player_id: PlayerId, intent: ClientIntent) -> Result<(), RoomError> {
        self.send(GameCommand::Intent { player_id, intent }).await
    }

    /// Removes the player from every room and drops their channel.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.send(GameCommand::Disconnect { player_id }).await
    }

    /// Metadata for one room, `None` if it was never created.
    pub async fn room_info(&self, room_id: RoomId) -> Result<Option<RoomInfo>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Inspect {
            room_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(GameCommand::Shutdown).await
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, command: GameCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// Elapsed time reported by one room's ticker.
struct RoomTick {
    room_id: RoomId,
    serial: u64,
    elapsed: Duration,
}

/// A running ticker task. Dropping it stops the task.
struct Ticker {
    serial: u64,
    task: JoinHandle<()>,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor {
    lobby: Lobby,
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<GameCommand>,
    tickers: HashMap<RoomId, Ticker>,
    next_serial: u64,
    tick_tx: mpsc::UnboundedSender<RoomTick>,
    tick_rx: mpsc::UnboundedReceiver<RoomTick>,
}

impl GameActor {
    async fn run(mut self) {
        tracing::info!(
            tick_ms = self.lobby.config().tick_interval.as_millis() as u64,
            "game actor started"
        );

        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle_command(command) {
                        break;
                    }
                }
                // The actor keeps `tick_tx`, so this never yields `None`.
                Some(tick) = self.tick_rx.recv() => self.handle_tick(tick),
            }
            self.sync_tickers();
        }

        tracing::info!(rooms = self.lobby.registry().len(), "game actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, command: GameCommand) -> bool {
        match command {
            GameCommand::Connect { player_id, sender } => {
                tracing::debug!(%player_id, "player connected");
                self.senders.insert(player_id, sender);
            }
            GameCommand::Intent { player_id, intent } => {
                tracing::trace!(%player_id, intent = intent.name(), "intent received");
                let dispatches = self.lobby.handle_intent(player_id, intent);
                self.dispatch(dispatches);
            }
            GameCommand::Disconnect { player_id } => {
                self.senders.remove(&player_id);
                let dispatches = self.lobby.disconnect(player_id);
                self.dispatch(dispatches);
                tracing::debug!(%player_id, "player disconnected");
            }
            GameCommand::Inspect { room_id, reply } => {
                let _ = reply.send(self.lobby.room(&room_id).map(RoomInfo::from));
            }
            GameCommand::Shutdown => {
                tracing::info!("game actor shutting down");
                return false;
            }
        }
        true
    }

    /// Advances one room, unless the tick came from a ticker that has
    /// since been replaced or stopped.
    fn handle_tick(&mut self, tick: RoomTick) {
        let current = self
            .tickers
            .get(&tick.room_id)
            .is_some_and(|ticker| ticker.serial == tick.serial);
        if !current {
            tracing::trace!(room_id = %tick.room_id, serial = tick.serial, "stale tick dropped");
            return;
        }
        let dispatches = self.lobby.advance_room(&tick.room_id, tick.elapsed);
        self.dispatch(dispatches);
    }

    /// Starts a ticker for every room that began counting down and stops
    /// the tickers of rooms that paused.
    fn sync_tickers(&mut self) {
        let registry = self.lobby.registry();
        self.tickers.retain(|room_id, _| {
            let active = registry
                .room(room_id)
                .is_some_and(|room| room.phase().is_counting_down());
            if !active {
                tracing::debug!(%room_id, "countdown ticker stopped");
            }
            active
        });

        for room_id in registry.counting_down() {
            if self.tickers.contains_key(&room_id) {
                continue;
            }
            self.next_serial += 1;
            let task = spawn_ticker(
                room_id.clone(),
                self.next_serial,
                self.lobby.config().tick_interval,
                self.tick_tx.clone(),
            );
            tracing::debug!(%room_id, serial = self.next_serial, "countdown ticker started");
            self.tickers.insert(
                room_id,
                Ticker {
                    serial: self.next_serial,
                    task,
                },
            );
        }
    }

    /// Delivers events. Drops silently when a receiver is gone.
    fn dispatch(&self, dispatches: Vec<Dispatch>) {
        for Dispatch {
            room_id,
            recipient,
            event,
        } in dispatches
        {
            match recipient {
                Recipient::Player(player_id) => {
                    if let Some(sender) = self.senders.get(&player_id) {
                        let _ = sender.send(event);
                    }
                }
                Recipient::All => {
                    let Some(room) = self.lobby.room(&room_id) else {
                        continue;
                    };
                    for player_id in room.players().keys() {
                        if let Some(sender) = self.senders.get(player_id) {
                            let _ = sender.send(event.clone());
                        }
                    }
                }
            }
        }
    }
}

/// Reports elapsed time for one room on a cadence anchored at spawn.
fn spawn_ticker(
    room_id: RoomId,
    serial: u64,
    interval: Duration,
    ticks: mpsc::UnboundedSender<RoomTick>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut scheduler = TickScheduler::new(TickConfig::with_interval(interval));
        loop {
            let info = scheduler.wait_for_tick().await;
            let tick = RoomTick {
                room_id: room_id.clone(),
                serial,
                elapsed: info.elapsed(),
            };
            if ticks.send(tick).is_err() {
                break;
            }
        }
    })
}

/// Spawns the game actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_game(
    config: GameConfig,
    selector: impl LoserSelector,
    channel_size: usize,
) -> GameHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let actor = GameActor {
        lobby: Lobby::new(config, selector),
        senders: HashMap::new(),
        receiver: rx,
        tickers: HashMap::new(),
        next_serial: 0,
        tick_tx,
        tick_rx,
    };

    tokio::spawn(actor.run());
    GameHandle { sender: tx }
}
