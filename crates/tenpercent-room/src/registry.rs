//! The room registry: every room the process has seen.

use std::collections::BTreeMap;

use tenpercent_protocol::{PlayerId, RoomId};

use crate::{GameConfig, Room};

/// Owns all rooms, keyed by id.
///
/// Rooms are created on first join and never destroyed; an empty room
/// keeps its round counter and timer setting. Ordered by id so that
/// multi-room steps (ticks, disconnects) run in a stable order.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room, creating it with defaults on first use.
    pub(crate) fn get_or_create(&mut self, room_id: &RoomId, config: &GameConfig) -> &mut Room {
        self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(%room_id, timer = config.default_timer, "room created");
            Room::new(room_id.clone(), config.default_timer)
        })
    }

    /// Removes a player from one room. A no-op (returning `false`) when
    /// the room or the player doesn't exist, so double-disconnects are safe.
    pub(crate) fn remove_player(&mut self, room_id: &RoomId, player_id: PlayerId) -> bool {
        self.rooms
            .get_mut(room_id)
            .is_some_and(|room| room.unseat(player_id))
    }

    /// Every room `player_id` is seated in.
    pub fn rooms_of(&self, player_id: PlayerId) -> Vec<RoomId> {
        self.rooms
            .values()
            .filter(|room| room.contains(player_id))
            .map(|room| room.id().clone())
            .collect()
    }

    /// Rooms with an active countdown.
    pub fn counting_down(&self) -> Vec<RoomId> {
        self.rooms
            .values()
            .filter(|room| room.phase().is_counting_down())
            .map(|room| room.id().clone())
            .collect()
    }

    /// Whether any room has an active countdown.
    pub fn any_counting_down(&self) -> bool {
        self.rooms.values().any(|room| room.phase().is_counting_down())
    }

    /// Looks up a room.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub(crate) fn room_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Number of rooms ever created.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room exists yet.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
