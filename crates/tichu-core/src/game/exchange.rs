use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use serde::{Deserialize, Serialize};
use std::array;
use thiserror::Error;

pub const EXCHANGE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("expected 3 cards, got {0}")]
    WrongCount(usize),
    #[error("{0} was offered twice")]
    DuplicateCard(Card),
    #[error("{0} is not in the hand")]
    CardNotInHand(Card),
    #[error("not every seat has submitted yet")]
    Incomplete,
}

/// Cards each seat has set aside for the other three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeState {
    submissions: [Option<[Card; EXCHANGE_SIZE]>; 4],
}

impl Default for ExchangeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeState {
    pub fn new() -> Self {
        Self {
            submissions: array::from_fn(|_| None),
        }
    }

    /// Seat receiving the card in `slot` of `from`'s submission.
    pub const fn recipient(from: Seat, slot: usize) -> Seat {
        from.offset(slot + 1)
    }

    pub fn has_submitted(&self, seat: Seat) -> bool {
        self.submissions[seat.index()].is_some()
    }

    /// Validates and stores a submission. The hand itself is left alone until
    /// every seat has submitted.
    pub fn submit(&mut self, seat: Seat, cards: &[Card], hand: &Hand) -> Result<(), ExchangeError> {
        let chosen: [Card; EXCHANGE_SIZE] = cards
            .try_into()
            .map_err(|_| ExchangeError::WrongCount(cards.len()))?;

        for (index, card) in chosen.iter().enumerate() {
            if chosen[..index].contains(card) {
                return Err(ExchangeError::DuplicateCard(*card));
            }
            if !hand.contains(*card) {
                return Err(ExchangeError::CardNotInHand(*card));
            }
        }

        self.submissions[seat.index()] = Some(chosen);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.submissions.iter().all(Option::is_some)
    }

    /// Swaps every submitted card into its recipient's hand.
    pub fn apply(&self, hands: &mut [Hand; 4]) -> Result<(), ExchangeError> {
        let mut all = [[Card::Dog; EXCHANGE_SIZE]; 4];
        for seat in Seat::LOOP {
            all[seat.index()] = self.submissions[seat.index()].ok_or(ExchangeError::Incomplete)?;
        }

        for seat in Seat::LOOP {
            let sent = &all[seat.index()];
            if !hands[seat.index()].remove_all(sent) {
                let missing = sent
                    .iter()
                    .copied()
                    .find(|card| !hands[seat.index()].contains(*card))
                    .unwrap_or(sent[0]);
                return Err(ExchangeError::CardNotInHand(missing));
            }
        }

        for seat in Seat::LOOP {
            for (slot, card) in all[seat.index()].iter().enumerate() {
                hands[Self::recipient(seat, slot).index()].add(*card);
            }
        }
        Ok(())
    }
}
