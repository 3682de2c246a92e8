//! Per-room ownership of match state. Intents for one room are applied one at
//! a time under that room's lock; different rooms never share a lock.

use crate::game::engine::{self, Rejection, Transition};
use crate::game::error::{EngineError, SeatingError};
use crate::game::events::GameEvent;
use crate::game::intent::Intent;
use crate::game::match_state::MatchState;
use crate::game::serialization::MatchSnapshot;
use crate::model::player::PlayerId;
use core::fmt;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug_span;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room {0} does not exist")]
    UnknownRoom(RoomId),
    #[error("room {0} is already open")]
    RoomExists(RoomId),
    #[error(transparent)]
    Seating(#[from] SeatingError),
}

/// Result of routing one intent into a room.
#[derive(Debug, Clone)]
pub enum RoomUpdate {
    /// Broadcast `snapshot` and the event messages to the whole room.
    Accepted {
        snapshot: MatchSnapshot,
        events: Vec<GameEvent>,
    },
    /// Report `error` to the acting player only, alongside the unchanged snapshot.
    Rejected {
        error: EngineError,
        snapshot: MatchSnapshot,
    },
}

impl RoomUpdate {
    pub fn snapshot(&self) -> &MatchSnapshot {
        match self {
            RoomUpdate::Accepted { snapshot, .. } | RoomUpdate::Rejected { snapshot, .. } => {
                snapshot
            }
        }
    }

    pub fn messages(&self) -> Vec<String> {
        match self {
            RoomUpdate::Accepted { events, .. } => events.iter().map(ToString::to_string).collect(),
            RoomUpdate::Rejected { .. } => Vec::new(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, RoomUpdate::Accepted { .. })
    }
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Mutex<MatchState>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats four players and deals the first turn. `seed` pins the shuffle stream.
    pub fn open_room(
        &self,
        room: RoomId,
        turn_order: [PlayerId; 4],
        seed: Option<u64>,
    ) -> Result<MatchSnapshot, RoomError> {
        let state = match seed {
            Some(seed) => MatchState::with_seed(turn_order, seed)?,
            None => MatchState::new(turn_order)?,
        };
        let snapshot = MatchSnapshot::capture(&state);

        let mut rooms = self.rooms.write();
        if rooms.contains_key(&room) {
            return Err(RoomError::RoomExists(room));
        }
        tracing::debug!(
            target: "tichu_core::rooms",
            room = %room,
            seed = state.seed(),
            "room opened"
        );
        rooms.insert(room, Mutex::new(state));
        Ok(snapshot)
    }

    pub fn apply(
        &self,
        room: &RoomId,
        player: &PlayerId,
        intent: Intent,
    ) -> Result<RoomUpdate, RoomError> {
        let rooms = self.rooms.read();
        let slot = rooms
            .get(room)
            .ok_or_else(|| RoomError::UnknownRoom(room.clone()))?;
        let mut state = slot.lock();
        let _span = debug_span!("room", room = %room).entered();

        let update = match engine::apply(&state, player, intent) {
            Ok(Transition { state: next, events }) => {
                *state = next;
                RoomUpdate::Accepted {
                    snapshot: MatchSnapshot::capture(&state),
                    events,
                }
            }
            Err(Rejection { error, state: unchanged }) => RoomUpdate::Rejected {
                error,
                snapshot: MatchSnapshot::capture(&unchanged),
            },
        };
        Ok(update)
    }

    pub fn snapshot(&self, room: &RoomId) -> Result<MatchSnapshot, RoomError> {
        self.inspect(room, MatchSnapshot::capture)
    }

    /// Runs `f` against the live state while holding the room lock.
    pub fn inspect<R>(
        &self,
        room: &RoomId,
        f: impl FnOnce(&MatchState) -> R,
    ) -> Result<R, RoomError> {
        let rooms = self.rooms.read();
        let slot = rooms
            .get(room)
            .ok_or_else(|| RoomError::UnknownRoom(room.clone()))?;
        let state = slot.lock();
        Ok(f(&*state))
    }

    /// Tears the room down and returns its final snapshot.
    pub fn close_room(&self, room: &RoomId) -> Result<MatchSnapshot, RoomError> {
        let state = self
            .rooms
            .write()
            .remove(room)
            .ok_or_else(|| RoomError::UnknownRoom(room.clone()))?
            .into_inner();
        tracing::debug!(
            target: "tichu_core::rooms",
            room = %room,
            turns = state.turn_number(),
            "room closed"
        );
        Ok(MatchSnapshot::capture(&state))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::{RoomError, RoomId, RoomRegistry, RoomUpdate};
    use crate::game::error::EngineError;
    use crate::game::intent::Intent;
    use crate::game::match_state::Phase;
    use crate::model::player::PlayerId;

    fn seating(prefix: &str) -> [PlayerId; 4] {
        ["n", "e", "s", "w"].map(|seat| PlayerId::new(format!("{prefix}-{seat}")))
    }

    #[test]
    fn unknown_room_is_an_error() {
        let registry = RoomRegistry::new();
        let room = RoomId::from("nowhere");
        assert_eq!(
            registry.snapshot(&room).unwrap_err(),
            RoomError::UnknownRoom(room.clone())
        );
        assert!(registry
            .apply(&room, &PlayerId::from("x"), Intent::Pass)
            .is_err());
    }

    #[test]
    fn opening_the_same_room_twice_fails() {
        let registry = RoomRegistry::new();
        let room = RoomId::from("a");
        registry.open_room(room.clone(), seating("a"), Some(1)).unwrap();
        assert_eq!(
            registry.open_room(room.clone(), seating("b"), Some(2)).unwrap_err(),
            RoomError::RoomExists(room)
        );
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn accepted_intents_replace_the_room_state() {
        let registry = RoomRegistry::new();
        let room = RoomId::from("r1");
        let players = seating("r1");
        registry.open_room(room.clone(), players.clone(), Some(3)).unwrap();

        for player in &players {
            let update = registry.apply(&room, player, Intent::PassBonus).unwrap();
            assert!(update.is_accepted());
        }
        assert_eq!(registry.snapshot(&room).unwrap().phase, Phase::SmallBonus);
    }

    #[test]
    fn rejections_leave_the_room_untouched() {
        let registry = RoomRegistry::new();
        let room = RoomId::from("r2");
        let players = seating("r2");
        let opened = registry.open_room(room.clone(), players.clone(), Some(3)).unwrap();

        let update = registry.apply(&room, &players[0], Intent::Pass).unwrap();
        match update {
            RoomUpdate::Rejected { error, snapshot } => {
                assert_eq!(error, EngineError::OutOfTurn);
                assert_eq!(snapshot, opened);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(registry.snapshot(&room).unwrap(), opened);
    }

    #[test]
    fn rooms_are_independent() {
        let registry = RoomRegistry::new();
        let left = RoomId::from("left");
        let right = RoomId::from("right");
        let left_players = seating("left");
        registry.open_room(left.clone(), left_players.clone(), Some(5)).unwrap();
        registry.open_room(right.clone(), seating("right"), Some(5)).unwrap();

        registry
            .apply(&left, &left_players[1], Intent::CallBonus { big: true })
            .unwrap();
        let right_snapshot = registry.snapshot(&right).unwrap();
        assert!(!right_snapshot.bonus.has_outstanding());

        let closed = registry.close_room(&left).unwrap();
        assert!(closed.bonus.has_outstanding());
        assert_eq!(registry.room_ids(), vec![right]);
    }
}
