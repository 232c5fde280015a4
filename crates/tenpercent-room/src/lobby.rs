//! The room lifecycle controller.
//!
//! [`Lobby`] turns player intents and elapsed time into room mutations
//! plus the events those mutations produce. It is plain synchronous
//! state: the game actor owns one and feeds it commands and ticks, and
//! tests drive it directly with virtual `dt`.

use std::time::Duration;

use rand::Rng;
use tenpercent_protocol::{
    ClientIntent, LooseNumber, LooseText, PlayerId, Recipient, RoomId, RoundResult, ServerEvent,
};
use tenpercent_tick::CountdownStep;
use tracing::{debug, info, trace, warn};

use crate::resolver::{self, LoserSelector};
use crate::{GameConfig, Player, Room, RoomError, RoomRegistry};

/// Sent when a round comes due but the room has emptied out.
pub const WARN_CANNOT_RUN: &str = "Not enough players to run a round.";

fn warn_cannot_start(min_players: usize) -> String {
    format!("Not enough players to start the round (minimum {min_players} required).")
}

/// An event addressed to one room's players, or one player in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub room_id: RoomId,
    pub recipient: Recipient,
    pub event: ServerEvent,
}

impl Dispatch {
    fn room(room_id: &RoomId, event: ServerEvent) -> Self {
        Self {
            room_id: room_id.clone(),
            recipient: Recipient::All,
            event,
        }
    }

    fn player(room_id: &RoomId, player_id: PlayerId, event: ServerEvent) -> Self {
        Self {
            room_id: room_id.clone(),
            recipient: Recipient::Player(player_id),
            event,
        }
    }
}

/// Owns every room and decides when each one counts down.
///
/// Each operation returns the events it produced, in emission order.
/// [`Recipient::All`] means "everyone seated in the room once the
/// operation has finished".
pub struct Lobby {
    config: GameConfig,
    registry: RoomRegistry,
    selector: Box<dyn LoserSelector>,
}

impl Lobby {
    /// Creates a lobby with no rooms. The config is validated first.
    pub fn new(config: GameConfig, selector: impl LoserSelector) -> Self {
        Self {
            config: config.validated(),
            registry: RoomRegistry::new(),
            selector: Box::new(selector),
        }
    }

    /// The validated configuration in effect.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read access to every room.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Shorthand for `registry().room(room_id)`.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.registry.room(room_id)
    }

    /// Whether the tick driver has anything to drive.
    pub fn has_active_countdowns(&self) -> bool {
        self.registry.any_counting_down()
    }

    /// Routes a decoded intent. Intents without a room id are dropped.
    pub fn handle_intent(&mut self, player_id: PlayerId, intent: ClientIntent) -> Vec<Dispatch> {
        if intent.room_id().is_empty() {
            debug!(%player_id, intent = intent.name(), "intent without room id, ignoring");
            return Vec::new();
        }
        match intent {
            ClientIntent::JoinRoom {
                room_id,
                name,
                starting_bet,
            } => self.join(player_id, &room_id, &name, starting_bet),
            ClientIntent::SetBet { room_id, bet } => self.set_bet(player_id, &room_id, bet),
            ClientIntent::SetName { room_id, name } => self.set_name(player_id, &room_id, &name),
            ClientIntent::SetTimer { room_id, timer } => self.set_timer(player_id, &room_id, timer),
            ClientIntent::LeaveRoom { room_id } => self.leave(player_id, &room_id),
        }
    }

    /// Seats `player_id` in `room_id`, creating the room on first use.
    ///
    /// A player already seated there gets a fresh seat (zero balance, no
    /// last result). A missing name becomes `Player_<n>`; the starting
    /// bet defaults to 5 when absent, invalid, or zero.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        room_id: &RoomId,
        name: &LooseText,
        starting_bet: LooseNumber,
    ) -> Vec<Dispatch> {
        let name = match name.non_empty() {
            Some(name) => self.config.truncate_name(name),
            None => placeholder_name(),
        };
        let bet = self.config.sanitize_starting_bet(starting_bet);

        let room = self.registry.get_or_create(room_id, &self.config);
        room.seat(player_id, Player::new(name, bet));
        info!(
            %room_id,
            %player_id,
            name = %room.player(player_id).map_or("", |p| p.name.as_str()),
            players = room.player_count(),
            "player joined"
        );

        let mut out = vec![
            Dispatch::player(
                room_id,
                player_id,
                ServerEvent::AllowedTimers(self.config.allowed_timers_payload(room.round_timer_secs())),
            ),
            Dispatch::room(room_id, ServerEvent::PlayersUpdate(room.snapshot())),
        ];
        self.reevaluate(room_id, &mut out);
        out
    }

    /// Updates a seated player's declared bet. Produces no events: bets
    /// stay secret until a round resolves.
    pub fn set_bet(&mut self, player_id: PlayerId, room_id: &RoomId, bet: LooseNumber) -> Vec<Dispatch> {
        let bet = self.config.sanitize_bet(bet);
        match self.seated_mut(player_id, room_id) {
            Some(player) => {
                player.declared_bet = bet;
                debug!(%room_id, %player_id, "declared bet changed");
            }
            None => debug!(%room_id, %player_id, "setBet from non-member, ignoring"),
        }
        Vec::new()
    }

    /// Renames a seated player and broadcasts the new snapshot.
    pub fn set_name(&mut self, player_id: PlayerId, room_id: &RoomId, name: &LooseText) -> Vec<Dispatch> {
        let name = self.config.truncate_name(name.0.as_deref().unwrap_or_default());
        let Some(player) = self.seated_mut(player_id, room_id) else {
            debug!(%room_id, %player_id, "setName from non-member, ignoring");
            return Vec::new();
        };
        player.name = name;

        self.registry
            .room(room_id)
            .map(|room| vec![Dispatch::room(room_id, ServerEvent::PlayersUpdate(room.snapshot()))])
            .unwrap_or_default()
    }

    /// Changes the room's round duration.
    ///
    /// Values not within [`GameConfig::TIMER_TOLERANCE`] of an allowed
    /// timer are rejected: the requester alone is re-sent the current
    /// choices and nothing else changes. An accepted value is announced
    /// to the whole room and takes effect on the next countdown.
    pub fn set_timer(&mut self, player_id: PlayerId, room_id: &RoomId, timer: LooseNumber) -> Vec<Dispatch> {
        let matched = timer.finite().and_then(|t| self.config.match_timer(t));
        let Some(room) = self.registry.room_mut(room_id) else {
            return Vec::new();
        };
        if !room.contains(player_id) {
            debug!(%room_id, %player_id, "setTimer from non-member, ignoring");
            return Vec::new();
        }

        let Some(seconds) = matched else {
            debug!(%room_id, %player_id, requested = ?timer.0, "timer rejected");
            let current = self.config.allowed_timers_payload(room.round_timer_secs());
            return vec![Dispatch::player(room_id, player_id, ServerEvent::AllowedTimers(current))];
        };

        room.round_timer_secs = seconds;
        debug!(%room_id, %player_id, seconds, "round timer changed");
        let mut out = vec![Dispatch::room(
            room_id,
            ServerEvent::AllowedTimers(self.config.allowed_timers_payload(seconds)),
        )];
        self.reevaluate(room_id, &mut out);
        out
    }

    /// Removes a player from one room.
    pub fn leave(&mut self, player_id: PlayerId, room_id: &RoomId) -> Vec<Dispatch> {
        let mut out = Vec::new();
        self.unseat(player_id, room_id, &mut out);
        out
    }

    /// Removes a player from every room they occupy. Safe to repeat.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Vec<Dispatch> {
        let mut out = Vec::new();
        for room_id in self.registry.rooms_of(player_id) {
            self.unseat(player_id, &room_id, &mut out);
        }
        out
    }

    /// Advances every active countdown by `dt`, resolving rounds that
    /// reach zero.
    pub fn advance(&mut self, dt: Duration) -> Vec<Dispatch> {
        let mut out = Vec::new();
        for room_id in self.registry.counting_down() {
            self.advance_into(&room_id, dt, &mut out);
        }
        out
    }

    /// Advances one room's countdown by `dt`. A paused or unknown room
    /// produces nothing.
    pub fn advance_room(&mut self, room_id: &RoomId, dt: Duration) -> Vec<Dispatch> {
        let mut out = Vec::new();
        self.advance_into(room_id, dt, &mut out);
        out
    }

    fn advance_into(&mut self, room_id: &RoomId, dt: Duration, out: &mut Vec<Dispatch>) {
        let Some(room) = self.registry.room_mut(room_id) else {
            return;
        };
        match room.advance_countdown(dt) {
            Some(CountdownStep::Tick(left)) => {
                trace!(%room_id, left, "countdown tick");
                out.push(Dispatch::room(room_id, ServerEvent::Timer(left)));
            }
            Some(CountdownStep::Expired) => {
                out.push(Dispatch::room(room_id, ServerEvent::Timer(0.0)));
                self.resolve(room_id, out);
            }
            Some(CountdownStep::Quiet) | None => {}
        }
    }

    fn seated_mut(&mut self, player_id: PlayerId, room_id: &RoomId) -> Option<&mut Player> {
        self.registry.room_mut(room_id)?.player_mut(player_id)
    }

    fn unseat(&mut self, player_id: PlayerId, room_id: &RoomId, out: &mut Vec<Dispatch>) {
        if !self.registry.remove_player(room_id, player_id) {
            return;
        }
        let Some(room) = self.registry.room(room_id) else {
            return;
        };
        info!(%room_id, %player_id, players = room.player_count(), "player left");
        out.push(Dispatch::room(room_id, ServerEvent::PlayersUpdate(room.snapshot())));
        self.reevaluate(room_id, out);
    }

    /// Paused below the player minimum, counting down otherwise.
    fn reevaluate(&mut self, room_id: &RoomId, out: &mut Vec<Dispatch>) {
        let Some(room) = self.registry.room_mut(room_id) else {
            return;
        };

        if room.player_count() < self.config.min_players {
            if room.stop_countdown() {
                debug!(%room_id, players = room.player_count(), "countdown stopped");
            }
            out.push(Dispatch::room(
                room_id,
                ServerEvent::Warning(warn_cannot_start(self.config.min_players)),
            ));
            return;
        }

        out.push(Dispatch::room(room_id, ServerEvent::Warning(String::new())));
        if let Some(seconds) = room.start_countdown(&self.config) {
            debug!(%room_id, seconds, "countdown started");
            out.push(Dispatch::room(room_id, ServerEvent::Timer(seconds)));
        }
    }

    fn resolve(&mut self, room_id: &RoomId, out: &mut Vec<Dispatch>) {
        let Some(room) = self.registry.room_mut(room_id) else {
            return;
        };

        match resolver::resolve_round(room, self.selector.as_mut(), &self.config) {
            Ok(report) => {
                info!(
                    %room_id,
                    round = report.round_index,
                    loser = %report.loser,
                    pot = report.pot,
                    "round resolved"
                );
                let players = room.snapshot();
                out.push(Dispatch::room(room_id, ServerEvent::PlayersUpdate(players.clone())));
                out.push(Dispatch::room(
                    room_id,
                    ServerEvent::RoundResult(RoundResult {
                        room_id: room_id.clone(),
                        round_index: report.round_index,
                        loser: report.loser,
                        players,
                    }),
                ));
                self.reevaluate(room_id, out);
            }
            Err(RoomError::InsufficientPlayers { have, .. }) => {
                debug!(%room_id, have, "round due without enough players");
                out.push(Dispatch::room(room_id, ServerEvent::Warning(WARN_CANNOT_RUN.to_owned())));
            }
            Err(err) => {
                warn!(%room_id, error = %err, "round resolution failed");
                self.reevaluate(room_id, out);
            }
        }
    }
}

fn placeholder_name() -> String {
    format!("Player_{}", rand::rng().random_range(0..1000))
}
