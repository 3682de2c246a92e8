//! Seated players for simulated rooms.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tichu_core::game::bonus::BonusCall;
use tichu_core::game::exchange::EXCHANGE_SIZE;
use tichu_core::model::card::Card;
use tichu_core::model::combination::{Combination, is_legal_play};
use tichu_core::model::hand::Hand;
use tichu_core::model::player::Seat;
use tichu_core::model::trick::Trick;
use tichu_core::{Intent, MatchState, Phase};

use crate::config::AgentConfig;

/// Largest combination an agent considers when leading.
const MAX_LEAD_SIZE: usize = 5;
const BOMB4_SIZE: usize = 4;

/// Picks the next intent for `seat`, which the runner has established is
/// expected to act.
pub trait Agent {
    fn choose(&mut self, state: &MatchState, seat: Seat) -> Intent;
}

/// Plays uniformly among legal combinations and takes optional actions with
/// the configured probabilities.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: StdRng,
    config: AgentConfig,
}

impl RandomAgent {
    pub fn new(seed: u64, config: AgentConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    fn bonus(&mut self, state: &MatchState, seat: Seat) -> Intent {
        match state.phase() {
            Phase::BigBonus if self.rng.gen_bool(self.config.big_bonus_rate) => {
                Intent::CallBonus { big: true }
            }
            Phase::SmallBonus
                if state.bonus().call(seat) != BonusCall::Big
                    && self.rng.gen_bool(self.config.small_bonus_rate) =>
            {
                Intent::CallBonus { big: false }
            }
            _ => Intent::PassBonus,
        }
    }

    fn exchange(&mut self, hand: &Hand) -> Intent {
        let cards = hand
            .cards()
            .choose_multiple(&mut self.rng, EXCHANGE_SIZE)
            .copied()
            .collect();
        Intent::SubmitExchange { cards }
    }

    fn dragon_recipient(&mut self, state: &MatchState, seat: Seat) -> Intent {
        let opponent = if self.rng.gen_bool(0.5) {
            seat.next()
        } else {
            seat.previous()
        };
        Intent::SendTrick {
            recipient: state.player(opponent).clone(),
        }
    }

    fn play(&mut self, state: &MatchState, seat: Seat) -> Intent {
        let table = state.current_trick().map(Trick::combination);
        let hand = state.hand(seat);

        if table.is_some() && self.rng.gen_bool(self.config.pass_rate) {
            return Intent::Pass;
        }

        let mut options: Vec<Intent> = candidate_plays(hand, table)
            .into_iter()
            .map(play_intent)
            .collect();
        if table.is_none() && hand.contains(Card::Dog) {
            options.push(Intent::PlayDog);
        }

        options
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or(Intent::Pass)
    }
}

impl Agent for RandomAgent {
    fn choose(&mut self, state: &MatchState, seat: Seat) -> Intent {
        match state.phase() {
            Phase::BigBonus | Phase::SmallBonus => self.bonus(state, seat),
            Phase::Exchange => self.exchange(state.hand(seat)),
            Phase::Play if state.pending_dragon_transfer() => self.dragon_recipient(state, seat),
            Phase::Play => self.play(state, seat),
            Phase::TurnEnd => Intent::AcknowledgeTurnEnd,
        }
    }
}

/// Every combination in `hand` that may be played on `table`. Leading
/// considers sets up to five cards; following considers the table's size
/// plus four-card bombs. The Dog is never part of a combination.
pub fn candidate_plays(hand: &Hand, table: Option<&Combination>) -> Vec<Combination> {
    let cards: Vec<Card> = hand.iter().copied().filter(|card| *card != Card::Dog).collect();
    let wanted = |size: usize| match table {
        None => size <= MAX_LEAD_SIZE,
        Some(table) => size == table.len() || size == BOMB4_SIZE,
    };

    let mut plays = Vec::new();
    for mask in 1u32..(1u32 << cards.len()) {
        if !wanted(mask.count_ones() as usize) {
            continue;
        }
        let subset: Vec<Card> = cards
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & (1 << index) != 0)
            .map(|(_, card)| *card)
            .collect();
        if let Some(combination) = Combination::from_cards(subset, table) {
            if is_legal_play(&combination, table) {
                plays.push(combination);
            }
        }
    }
    plays
}

fn play_intent(combination: Combination) -> Intent {
    Intent::Play {
        claimed: combination.kind(),
        cards: combination.cards().to_vec(),
    }
}

/// The most conservative intent for `seat`: decline every option, lead the
/// lowest card. Used when an agent's choice is refused.
pub fn fallback_intent(state: &MatchState, seat: Seat) -> Intent {
    match state.phase() {
        Phase::BigBonus | Phase::SmallBonus => Intent::PassBonus,
        Phase::Exchange => Intent::SubmitExchange {
            cards: state.hand(seat).cards().iter().take(EXCHANGE_SIZE).copied().collect(),
        },
        Phase::TurnEnd => Intent::AcknowledgeTurnEnd,
        Phase::Play if state.pending_dragon_transfer() => Intent::SendTrick {
            recipient: state.player(seat.next()).clone(),
        },
        Phase::Play if state.current_trick().is_some() => Intent::Pass,
        Phase::Play => state
            .hand(seat)
            .iter()
            .copied()
            .find(|card| *card != Card::Dog)
            .and_then(|card| Combination::from_cards(vec![card], None))
            .map(play_intent)
            .unwrap_or(Intent::PlayDog),
    }
}
