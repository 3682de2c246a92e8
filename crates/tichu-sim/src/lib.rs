//! Seeded self-play harness for `tichu-core`: loads a YAML run description,
//! seats random agents in concurrent rooms and records every finished turn.

pub mod agent;
pub mod config;
pub mod logging;
pub mod runner;
