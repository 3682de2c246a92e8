use crate::game::bonus::{BonusCall, BonusLedger};
use crate::game::error::SeatingError;
use crate::game::exchange::ExchangeState;
use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::hand::Hand;
use crate::model::player::{PlayerId, Seat};
use crate::model::score::ScoreBoard;
use crate::model::trick::Trick;
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::array;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    BigBonus,
    SmallBonus,
    Exchange,
    Play,
    TurnEnd,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::BigBonus => "BIG_BONUS",
            Phase::SmallBonus => "SMALL_BONUS",
            Phase::Exchange => "EXCHANGE",
            Phase::Play => "PLAY",
            Phase::TurnEnd => "TURN_END",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the engine knows about one table. Transitions never edit a
/// live value in place: they clone, mutate the clone and hand it back.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) turn_order: [PlayerId; 4],
    pub(crate) scores: ScoreBoard,
    pub(crate) hands: [Hand; 4],
    pub(crate) collected: [Vec<Card>; 4],
    pub(crate) current_trick: Option<Trick>,
    pub(crate) cards_played_this_turn: Vec<Card>,
    pub(crate) on_play: Option<Seat>,
    pub(crate) pass_count: u8,
    pub(crate) finished: Vec<Seat>,
    pub(crate) phase: Phase,
    pub(crate) bonus: BonusLedger,
    pub(crate) exchange: ExchangeState,
    pub(crate) acknowledged: [bool; 4],
    pub(crate) pending_dragon_transfer: bool,
    pub(crate) turn_number: u32,
    rng: StdRng,
    seed: u64,
}

impl MatchState {
    pub fn new(turn_order: [PlayerId; 4]) -> Result<Self, SeatingError> {
        let seed: u64 = rand::random();
        Self::with_seed(turn_order, seed)
    }

    /// Seats the players and deals the first turn from a deterministic shuffle.
    pub fn with_seed(turn_order: [PlayerId; 4], seed: u64) -> Result<Self, SeatingError> {
        validate_seating(&turn_order)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let hands = Deck::shuffled(&mut rng).deal();
        Ok(Self::assemble(turn_order, hands, Phase::BigBonus, rng, seed, 1))
    }

    /// Seats the players with hands chosen by the caller instead of a shuffle.
    /// Entering `Phase::Play` hands the lead to whoever holds the Mahjong.
    pub fn from_hands(
        turn_order: [PlayerId; 4],
        hands: [Vec<Card>; 4],
        phase: Phase,
    ) -> Result<Self, SeatingError> {
        validate_seating(&turn_order)?;
        let hands = hands.map(Hand::with_cards);
        let seed = 0;
        let rng = rng_at_turn(seed, 1);
        let mut state = Self::assemble(turn_order, hands, phase, rng, seed, 1);
        if phase == Phase::Play {
            state.on_play = Some(state.holder_of(Card::Mahjong).unwrap_or(Seat::North));
        }
        Ok(state)
    }

    /// Pre-loads the bonus ledger, as if the calls were made in the bonus windows.
    pub fn with_bonus_calls(mut self, calls: [BonusCall; 4]) -> Self {
        for seat in Seat::LOOP {
            self.bonus.record(seat, calls[seat.index()]);
        }
        self.bonus.open_window();
        self
    }

    pub(crate) fn restored(
        turn_order: [PlayerId; 4],
        seed: u64,
        turn_number: u32,
        hands: [Hand; 4],
        phase: Phase,
    ) -> Result<Self, SeatingError> {
        validate_seating(&turn_order)?;
        let turn_number = turn_number.max(1);
        let rng = rng_at_turn(seed, turn_number);
        Ok(Self::assemble(turn_order, hands, phase, rng, seed, turn_number))
    }

    fn assemble(
        turn_order: [PlayerId; 4],
        hands: [Hand; 4],
        phase: Phase,
        rng: StdRng,
        seed: u64,
        turn_number: u32,
    ) -> Self {
        Self {
            turn_order,
            scores: ScoreBoard::new(),
            hands,
            collected: array::from_fn(|_| Vec::new()),
            current_trick: None,
            cards_played_this_turn: Vec::new(),
            on_play: None,
            pass_count: 0,
            finished: Vec::new(),
            phase,
            bonus: BonusLedger::new(),
            exchange: ExchangeState::new(),
            acknowledged: [false; 4],
            pending_dragon_transfer: false,
            turn_number,
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn turn_order(&self) -> &[PlayerId; 4] {
        &self.turn_order
    }

    pub fn player(&self, seat: Seat) -> &PlayerId {
        &self.turn_order[seat.index()]
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        self.turn_order
            .iter()
            .position(|id| id == player)
            .and_then(Seat::from_index)
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn collected(&self, seat: Seat) -> &[Card] {
        &self.collected[seat.index()]
    }

    pub fn current_trick(&self) -> Option<&Trick> {
        self.current_trick.as_ref()
    }

    pub fn cards_played_this_turn(&self) -> &[Card] {
        &self.cards_played_this_turn
    }

    pub fn on_play(&self) -> Option<Seat> {
        self.on_play
    }

    pub fn pass_count(&self) -> u8 {
        self.pass_count
    }

    pub fn finished(&self) -> &[Seat] {
        &self.finished
    }

    pub fn has_finished(&self, seat: Seat) -> bool {
        self.finished.contains(&seat)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bonus(&self) -> &BonusLedger {
        &self.bonus
    }

    pub fn exchange(&self) -> &ExchangeState {
        &self.exchange
    }

    pub fn has_acknowledged(&self, seat: Seat) -> bool {
        self.acknowledged[seat.index()]
    }

    pub fn pending_dragon_transfer(&self) -> bool {
        self.pending_dragon_transfer
    }

    pub fn holder_of(&self, card: Card) -> Option<Seat> {
        Seat::LOOP
            .iter()
            .copied()
            .find(|seat| self.hands[seat.index()].contains(card))
    }

    /// Cards held, on the table or collected. Equals the deck size throughout play.
    pub fn accounted_cards(&self) -> usize {
        self.hands.iter().map(Hand::len).sum::<usize>()
            + self.cards_played_this_turn.len()
            + self.collected.iter().map(Vec::len).sum::<usize>()
    }

    pub(crate) fn active_count(&self) -> usize {
        Seat::LOOP.len() - self.finished.len()
    }

    /// First seat after `seat` in turn order that still holds cards.
    pub(crate) fn next_active_after(&self, seat: Seat) -> Seat {
        (1..=Seat::LOOP.len())
            .map(|steps| seat.offset(steps))
            .find(|candidate| !self.has_finished(*candidate))
            .unwrap_or(seat)
    }

    /// Starts the following turn: fresh deal from the match's own shuffle
    /// stream, everything but seating and scores reset.
    pub(crate) fn deal_next_turn(&mut self) {
        self.hands = Deck::shuffled(&mut self.rng).deal();
        self.collected = array::from_fn(|_| Vec::new());
        self.current_trick = None;
        self.cards_played_this_turn.clear();
        self.on_play = None;
        self.pass_count = 0;
        self.finished.clear();
        self.phase = Phase::BigBonus;
        self.bonus.clear();
        self.exchange = ExchangeState::new();
        self.acknowledged = [false; 4];
        self.pending_dragon_transfer = false;
        self.turn_number += 1;
        debug_assert_eq!(self.accounted_cards(), DECK_SIZE);
    }
}

fn validate_seating(turn_order: &[PlayerId; 4]) -> Result<(), SeatingError> {
    for (index, player) in turn_order.iter().enumerate() {
        if turn_order[..index].contains(player) {
            return Err(SeatingError::DuplicatePlayer(player.clone()));
        }
    }
    Ok(())
}

/// Shuffle stream positioned as it is after `turn_number` deals.
fn rng_at_turn(seed: u64, turn_number: u32) -> StdRng {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..turn_number {
        let _ = Deck::shuffled(&mut rng);
    }
    rng
}

#[cfg(test)]
mod tests {
    use super::{MatchState, Phase};
    use crate::game::error::SeatingError;
    use crate::model::card::Card;
    use crate::model::deck::DECK_SIZE;
    use crate::model::player::{PlayerId, Seat};

    fn seating() -> [PlayerId; 4] {
        ["n", "e", "s", "w"].map(PlayerId::from)
    }

    #[test]
    fn new_match_starts_in_big_bonus_on_turn_one() {
        let state = MatchState::with_seed(seating(), 0).unwrap();
        assert_eq!(state.phase(), Phase::BigBonus);
        assert_eq!(state.turn_number(), 1);
        assert_eq!(state.on_play(), None);
        assert_eq!(state.accounted_cards(), DECK_SIZE);
        for seat in Seat::LOOP {
            assert_eq!(state.hand(seat).len(), 14);
        }
    }

    #[test]
    fn duplicate_players_are_rejected() {
        let seats = ["a", "b", "a", "c"].map(PlayerId::from);
        assert_eq!(
            MatchState::with_seed(seats, 1).unwrap_err(),
            SeatingError::DuplicatePlayer(PlayerId::from("a"))
        );
    }

    #[test]
    fn same_seed_deals_same_hands() {
        let a = MatchState::with_seed(seating(), 77).unwrap();
        let b = MatchState::with_seed(seating(), 77).unwrap();
        for seat in Seat::LOOP {
            assert_eq!(a.hand(seat), b.hand(seat));
        }
        assert_eq!(a.seed(), 77);
    }

    #[test]
    fn seats_follow_turn_order() {
        let state = MatchState::with_seed(seating(), 3).unwrap();
        assert_eq!(state.seat_of(&PlayerId::from("s")), Some(Seat::South));
        assert_eq!(state.seat_of(&PlayerId::from("x")), None);
        assert_eq!(state.player(Seat::West).as_str(), "w");
    }

    #[test]
    fn next_active_skips_finished_seats() {
        let mut state = MatchState::with_seed(seating(), 3).unwrap();
        state.finished = vec![Seat::East, Seat::South];
        assert_eq!(state.next_active_after(Seat::North), Seat::West);
        assert_eq!(state.next_active_after(Seat::West), Seat::North);
        assert_eq!(state.active_count(), 2);
    }

    #[test]
    fn next_turn_keeps_scores_and_redeals() {
        let mut state = MatchState::with_seed(seating(), 5).unwrap();
        let first_hand = state.hand(Seat::North).clone();
        state.scores.set_totals([40, 60]);
        state.phase = Phase::TurnEnd;
        state.finished = vec![Seat::North];

        state.deal_next_turn();

        assert_eq!(state.turn_number(), 2);
        assert_eq!(state.phase(), Phase::BigBonus);
        assert_eq!(state.scores().standings(), &[40, 60]);
        assert!(state.finished().is_empty());
        assert_ne!(state.hand(Seat::North), &first_hand);
    }

    #[test]
    fn from_hands_in_play_leads_with_mahjong_holder() {
        let hands = [
            vec![Card::Dog],
            vec![Card::Phoenix],
            vec![Card::Mahjong],
            vec![Card::Dragon],
        ];
        let state = MatchState::from_hands(seating(), hands, Phase::Play).unwrap();
        assert_eq!(state.on_play(), Some(Seat::South));
        assert_eq!(state.holder_of(Card::Dragon), Some(Seat::West));
    }
}
