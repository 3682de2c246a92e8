//! Rule engine for four-player, two-team Tichu.
//!
//! [`game::engine::apply`] is the single entry point that moves a table
//! forward; [`game::rooms::RoomRegistry`] keeps one table per room.

pub mod game;
pub mod model;

pub use game::engine::{Rejection, Transition, apply};
pub use game::error::{EngineError, SeatingError};
pub use game::intent::Intent;
pub use game::match_state::{MatchState, Phase};
pub use game::rooms::{RoomError, RoomId, RoomRegistry, RoomUpdate};
pub use game::serialization::MatchSnapshot;
