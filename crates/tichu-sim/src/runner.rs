use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tichu_core::game::events::GameEvent;
use tichu_core::game::serialization::MatchSnapshot;
use tichu_core::model::player::{PlayerId, Seat};
use tichu_core::{
    EngineError, Intent, MatchState, Phase, RoomError, RoomId, RoomRegistry, RoomUpdate,
};
use tracing::{Level, event, info_span};

use crate::agent::{Agent, RandomAgent, fallback_intent};
use crate::config::{ResolvedOutputs, SimConfig};

/// Intents allowed per turn before a room is declared stuck.
const MAX_STEPS_PER_TURN: usize = 4_000;
const SEAT_LABELS: [&str; 4] = ["north", "east", "south", "west"];

/// Drives the configured number of rooms to completion and records every
/// finished turn.
pub struct SimRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
    registry: RoomRegistry,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rooms: usize,
    pub turns_per_room: usize,
    pub rows_written: usize,
    pub rejections: usize,
    pub jsonl_path: PathBuf,
    /// Cumulative team scores per room, in room order.
    pub final_scores: Vec<(RoomId, [i32; 2])>,
}

/// One JSONL row: the outcome of a single completed turn in one room.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRow {
    pub run_id: String,
    pub room: String,
    pub room_seed: u64,
    pub turn: u32,
    pub ending: TurnEnding,
    pub finish_order: Vec<String>,
    pub turn_points: [i32; 2],
    pub totals: [i32; 2],
    pub messages: Vec<String>,
    pub intents: usize,
    pub rejections: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEnding {
    /// Three players went out; the last one forfeited their cards.
    Normal,
    /// Partners went out first and second.
    TeamFinish,
}

struct RoomOutcome {
    room: RoomId,
    rows: Vec<TurnRow>,
    totals: [i32; 2],
}

impl SimRunner {
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Self {
        Self {
            config,
            outputs,
            registry: RoomRegistry::new(),
        }
    }

    /// Execute the run, writing JSONL rows in room order once every room is done.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;

        let mut master = StdRng::seed_from_u64(self.config.seed.unwrap_or(0));
        let rooms: Vec<(RoomId, u64)> = (0..self.config.rooms)
            .map(|index| {
                let room = RoomId::new(format!("{}-room{index:03}", self.config.run_id));
                (room, master.next_u64())
            })
            .collect();

        for (room, seed) in &rooms {
            self.registry
                .open_room(room.clone(), seating(room), Some(*seed))?;
        }

        let outcomes: Vec<Result<RoomOutcome, RunnerError>> = thread::scope(|scope| {
            let handles: Vec<_> = rooms
                .iter()
                .map(|(room, seed)| {
                    let handle = scope.spawn(move || self.play_room(room, *seed));
                    (room, handle)
                })
                .collect();
            handles
                .into_iter()
                .map(|(room, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(RunnerError::Panicked { room: room.clone() }))
                })
                .collect()
        });

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rows_written = 0usize;
        let mut rejections = 0usize;
        let mut final_scores = Vec::with_capacity(rooms.len());
        for outcome in outcomes {
            let outcome = outcome?;
            for row in &outcome.rows {
                serde_json::to_writer(&mut writer, row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
                rejections += row.rejections;
            }
            self.registry.close_room(&outcome.room)?;
            final_scores.push((outcome.room, outcome.totals));
        }
        writer.flush()?;

        event!(
            target: "tichu_sim::runner",
            Level::INFO,
            run_id = %self.config.run_id,
            rooms = rooms.len(),
            rows_written,
            rejections,
            "run complete"
        );

        Ok(RunSummary {
            rooms: rooms.len(),
            turns_per_room: self.config.turns,
            rows_written,
            rejections,
            jsonl_path: self.outputs.jsonl.clone(),
            final_scores,
        })
    }

    fn play_room(&self, room: &RoomId, seed: u64) -> Result<RoomOutcome, RunnerError> {
        let _span = info_span!("room", room = %room, seed).entered();
        let mut agents = Seat::LOOP.map(|seat| {
            RandomAgent::new(
                seed.wrapping_add(seat.index() as u64 + 1),
                self.config.agents.clone(),
            )
        });

        let mut rows = Vec::with_capacity(self.config.turns);
        let mut tracker = TurnTracker::default();

        while rows.len() < self.config.turns {
            if tracker.intents >= MAX_STEPS_PER_TURN {
                let turn = self.registry.inspect(room, MatchState::turn_number)?;
                return Err(RunnerError::StepLimit {
                    room: room.clone(),
                    turn,
                    steps: tracker.intents,
                });
            }

            let (seat, player, intent) = self.registry.inspect(room, |state| {
                let seat = actor(state);
                let intent = agents[seat.index()].choose(state, seat);
                (seat, state.player(seat).clone(), intent)
            })?;

            let update = self.submit(room, seat, &player, intent, &mut tracker)?;
            let (snapshot, events) = match update {
                RoomUpdate::Accepted { snapshot, events } => (snapshot, events),
                RoomUpdate::Rejected { error, .. } => {
                    let fallback = self
                        .registry
                        .inspect(room, |state| fallback_intent(state, seat))?;
                    match self.submit(room, seat, &player, fallback, &mut tracker)? {
                        RoomUpdate::Accepted { snapshot, events } => (snapshot, events),
                        RoomUpdate::Rejected { .. } => {
                            return Err(RunnerError::Stalled {
                                room: room.clone(),
                                player,
                                error,
                            });
                        }
                    }
                }
            };

            tracker.messages.extend(events.iter().map(ToString::to_string));
            let ending = events.iter().find_map(|event| match event {
                GameEvent::TurnEnded => Some(TurnEnding::Normal),
                GameEvent::TeamFinished => Some(TurnEnding::TeamFinish),
                _ => None,
            });
            if let Some(ending) = ending {
                let row = tracker.finish(&self.config.run_id, room, seed, ending, &snapshot);
                event!(
                    target: "tichu_sim::runner",
                    Level::INFO,
                    turn = row.turn,
                    ending = ?row.ending,
                    turn_points = ?row.turn_points,
                    totals = ?row.totals,
                    "turn recorded"
                );
                rows.push(row);
            }
        }

        let totals = self
            .registry
            .inspect(room, |state| *state.scores().standings())?;
        Ok(RoomOutcome {
            room: room.clone(),
            rows,
            totals,
        })
    }

    fn submit(
        &self,
        room: &RoomId,
        seat: Seat,
        player: &PlayerId,
        intent: Intent,
        tracker: &mut TurnTracker,
    ) -> Result<RoomUpdate, RunnerError> {
        let label = intent.label();
        let update = self.registry.apply(room, player, intent)?;
        tracker.intents += 1;
        if let RoomUpdate::Rejected { error, .. } = &update {
            tracker.rejections += 1;
            event!(
                target: "tichu_sim::runner",
                Level::WARN,
                seat = SEAT_LABELS[seat.index()],
                intent = label,
                error = %error,
                "agent intent refused"
            );
        } else {
            event!(
                target: "tichu_sim::runner",
                Level::DEBUG,
                seat = SEAT_LABELS[seat.index()],
                intent = label,
                "agent intent applied"
            );
        }
        Ok(update)
    }
}

/// Counters for the turn in progress.
#[derive(Debug, Default)]
struct TurnTracker {
    intents: usize,
    rejections: usize,
    messages: Vec<String>,
    totals_at_start: [i32; 2],
}

impl TurnTracker {
    fn finish(
        &mut self,
        run_id: &str,
        room: &RoomId,
        room_seed: u64,
        ending: TurnEnding,
        snapshot: &MatchSnapshot,
    ) -> TurnRow {
        let totals = snapshot.teams.each_ref().map(|team| team.score);
        let turn_points = [
            totals[0] - self.totals_at_start[0],
            totals[1] - self.totals_at_start[1],
        ];
        let row = TurnRow {
            run_id: run_id.to_string(),
            room: room.to_string(),
            room_seed,
            turn: snapshot.turn_number,
            ending,
            finish_order: snapshot
                .finished
                .iter()
                .map(|player| player.as_str().to_string())
                .collect(),
            turn_points,
            totals,
            messages: std::mem::take(&mut self.messages),
            intents: self.intents,
            rejections: self.rejections,
        };
        *self = TurnTracker {
            totals_at_start: totals,
            ..TurnTracker::default()
        };
        row
    }
}

/// The seat whose answer the table is waiting for.
fn actor(state: &MatchState) -> Seat {
    match state.phase() {
        Phase::Play => state.on_play().unwrap_or(Seat::North),
        Phase::BigBonus | Phase::SmallBonus => {
            first_seat(|seat| !state.bonus().has_responded(seat))
        }
        Phase::Exchange => first_seat(|seat| !state.exchange().has_submitted(seat)),
        Phase::TurnEnd => first_seat(|seat| !state.has_acknowledged(seat)),
    }
}

fn first_seat(pending: impl Fn(Seat) -> bool) -> Seat {
    Seat::LOOP
        .into_iter()
        .find(|seat| pending(*seat))
        .unwrap_or(Seat::North)
}

fn seating(room: &RoomId) -> [PlayerId; 4] {
    SEAT_LABELS.map(|label| PlayerId::new(format!("{room}-{label}")))
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize turn row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("room {room} stalled: {player} had no accepted intent ({error})")]
    Stalled {
        room: RoomId,
        player: PlayerId,
        error: EngineError,
    },
    #[error("room {room} exceeded {steps} intents in turn {turn}")]
    StepLimit { room: RoomId, turn: u32, steps: usize },
    #[error("room {room} worker panicked")]
    Panicked { room: RoomId },
}

#[cfg(test)]
mod tests {
    use super::{SimRunner, TurnEnding, actor};
    use crate::config::{AgentConfig, LoggingConfig, OutputsConfig, SimConfig};
    use tempfile::tempdir;
    use tichu_core::model::player::{PlayerId, Seat};
    use tichu_core::{Intent, MatchState, Phase, apply};

    fn config(dir: &std::path::Path, rooms: usize, turns: usize) -> SimConfig {
        let mut cfg = SimConfig {
            run_id: "unit".to_string(),
            rooms,
            turns,
            seed: Some(17),
            agents: AgentConfig::default(),
            outputs: OutputsConfig {
                jsonl: dir.join("{run_id}/turns.jsonl").display().to_string(),
            },
            logging: LoggingConfig::default(),
        };
        cfg.validate().expect("valid config");
        cfg
    }

    #[test]
    fn actor_follows_the_open_window() {
        let mut state = MatchState::with_seed(["n", "e", "s", "w"].map(PlayerId::from), 5).unwrap();
        assert_eq!(actor(&state), Seat::North);
        state = apply(&state, &PlayerId::from("n"), Intent::PassBonus).unwrap().state;
        assert_eq!(actor(&state), Seat::East);
        assert_eq!(state.phase(), Phase::BigBonus);
    }

    #[test]
    fn every_room_records_the_requested_turns() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), 3, 2);
        let outputs = cfg.resolved_outputs();
        let runner = SimRunner::new(cfg, outputs);

        let summary = runner.run().expect("run completes");

        assert_eq!(summary.rows_written, 6);
        assert_eq!(summary.final_scores.len(), 3);
        assert_eq!(runner.registry.room_count(), 0);

        let text = std::fs::read_to_string(&summary.jsonl_path).expect("rows written");
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("row is JSON"))
            .collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["room"], "unit-room000");
        assert_eq!(rows[0]["turn"], 1);
        assert_eq!(rows[1]["turn"], 2);
        assert_eq!(rows[5]["room"], "unit-room002");

        for row in &rows {
            let points: i64 = row["turn_points"]
                .as_array()
                .expect("points array")
                .iter()
                .map(|value| value.as_i64().expect("integer"))
                .sum();
            let ending = row["ending"].as_str().expect("ending label");
            let bonus_swing: i64 = row["messages"]
                .as_array()
                .expect("messages array")
                .iter()
                .filter_map(|message| message.as_str())
                .map(|message| bonus_points(message))
                .sum();
            let base = if ending == "normal" { 100 } else { 200 };
            assert_eq!(points - bonus_swing, base, "row {row}");
        }
    }

    fn bonus_points(message: &str) -> i64 {
        let sign = if message.contains("successfully completed") {
            1
        } else if message.contains("failed to complete") {
            -1
        } else {
            return 0;
        };
        let value = if message.contains("Grand Tichu") { 200 } else { 100 };
        sign * value
    }

    #[test]
    fn endings_serialize_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&TurnEnding::TeamFinish).unwrap(),
            "\"team_finish\""
        );
    }
}
