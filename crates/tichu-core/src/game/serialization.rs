use super::match_state::{MatchState, Phase};
use crate::game::bonus::BonusLedger;
use crate::game::error::SeatingError;
use crate::game::exchange::ExchangeState;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::{PlayerId, Seat, Team};
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamView {
    pub index: usize,
    pub players: [PlayerId; 2],
    pub score: i32,
}

/// Broadcast view of a table: the whole match state minus the shuffle stream,
/// which is rebuilt from `seed` and `turn_number` on restore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub seed: u64,
    pub turn_number: u32,
    pub phase: Phase,
    pub turn_order: [PlayerId; 4],
    pub teams: [TeamView; 2],
    pub hands: [Hand; 4],
    pub collected: [Vec<Card>; 4],
    pub current_trick: Option<Trick>,
    pub cards_played_this_turn: Vec<Card>,
    pub on_play: Option<PlayerId>,
    pub pass_count: u8,
    pub finished: Vec<PlayerId>,
    pub bonus: BonusLedger,
    pub exchange: ExchangeState,
    pub acknowledged: [bool; 4],
    pub pending_dragon_transfer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    #[error(transparent)]
    Seating(#[from] SeatingError),
    #[error("{0} is not in the snapshot's turn order")]
    UnknownPlayer(PlayerId),
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        let teams = Team::BOTH.map(|team| TeamView {
            index: team.index(),
            players: team.members().map(|seat| state.player(seat).clone()),
            score: state.scores().score(team),
        });

        MatchSnapshot {
            seed: state.seed(),
            turn_number: state.turn_number(),
            phase: state.phase(),
            turn_order: state.turn_order().clone(),
            teams,
            hands: Seat::LOOP.map(|seat| state.hand(seat).clone()),
            collected: Seat::LOOP.map(|seat| state.collected(seat).to_vec()),
            current_trick: state.current_trick().cloned(),
            cards_played_this_turn: state.cards_played_this_turn().to_vec(),
            on_play: state.on_play().map(|seat| state.player(seat).clone()),
            pass_count: state.pass_count(),
            finished: state
                .finished()
                .iter()
                .map(|seat| state.player(*seat).clone())
                .collect(),
            bonus: state.bonus().clone(),
            exchange: state.exchange().clone(),
            acknowledged: Seat::LOOP.map(|seat| state.has_acknowledged(seat)),
            pending_dragon_transfer: state.pending_dragon_transfer(),
        }
    }

    /// Rebuilds a live state. Later deals continue the same shuffle stream.
    pub fn restore(self) -> Result<MatchState, RestoreError> {
        let mut state = MatchState::restored(
            self.turn_order,
            self.seed,
            self.turn_number,
            self.hands,
            self.phase,
        )?;
        let seat_of = |state: &MatchState, player: PlayerId| {
            state
                .seat_of(&player)
                .ok_or(RestoreError::UnknownPlayer(player))
        };

        for team in &self.teams {
            if let Some(side) = Team::BOTH.get(team.index) {
                state.scores.add(*side, team.score);
            }
        }
        state.collected = self.collected;
        state.current_trick = self.current_trick;
        state.cards_played_this_turn = self.cards_played_this_turn;
        state.on_play = match self.on_play {
            Some(player) => Some(seat_of(&state, player)?),
            None => None,
        };
        state.pass_count = self.pass_count;
        state.finished = self
            .finished
            .into_iter()
            .map(|player| seat_of(&state, player))
            .collect::<Result<_, _>>()?;
        state.bonus = self.bonus;
        state.exchange = self.exchange;
        state.acknowledged = self.acknowledged;
        state.pending_dragon_transfer = self.pending_dragon_transfer;
        Ok(state)
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
