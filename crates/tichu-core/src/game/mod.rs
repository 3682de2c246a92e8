pub mod bonus;
pub mod engine;
pub mod error;
pub mod events;
pub mod exchange;
pub mod intent;
pub mod match_state;
pub mod rooms;
pub mod serialization;
mod turn_end;
mod windows;
