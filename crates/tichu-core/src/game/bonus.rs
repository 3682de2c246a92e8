use crate::model::player::Seat;
use serde::{Deserialize, Serialize};

/// A declared bet that the caller empties their hand first this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BonusCall {
    #[default]
    None,
    Small,
    Big,
}

impl BonusCall {
    pub const fn value(self) -> i32 {
        match self {
            BonusCall::None => 0,
            BonusCall::Small => 100,
            BonusCall::Big => 200,
        }
    }

    pub const fn is_called(self) -> bool {
        !matches!(self, BonusCall::None)
    }

    pub const fn label(self) -> &'static str {
        match self {
            BonusCall::None => "None",
            BonusCall::Small => "Tichu",
            BonusCall::Big => "Grand Tichu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusOutcome {
    pub seat: Seat,
    pub call: BonusCall,
    pub succeeded: bool,
}

impl BonusOutcome {
    /// Signed score change for the caller's team.
    pub const fn points(&self) -> i32 {
        if self.succeeded {
            self.call.value()
        } else {
            -self.call.value()
        }
    }
}

/// Outstanding calls plus who has answered in the currently open window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusLedger {
    calls: [BonusCall; 4],
    responded: [bool; 4],
}

impl BonusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call(&self, seat: Seat) -> BonusCall {
        self.calls[seat.index()]
    }

    pub fn calls(&self) -> &[BonusCall; 4] {
        &self.calls
    }

    pub fn has_responded(&self, seat: Seat) -> bool {
        self.responded[seat.index()]
    }

    /// Records the seat's answer for the open window. `BonusCall::None` keeps
    /// whatever the seat committed to earlier.
    pub fn record(&mut self, seat: Seat, call: BonusCall) {
        if call.is_called() {
            self.calls[seat.index()] = call;
        }
        self.responded[seat.index()] = true;
    }

    pub fn window_complete(&self) -> bool {
        self.responded.iter().all(|answered| *answered)
    }

    pub fn open_window(&mut self) {
        self.responded = [false; 4];
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_outstanding(&self) -> bool {
        self.calls.iter().any(|call| call.is_called())
    }

    /// Judges every outstanding call against the first player to finish and
    /// wipes the ledger. The finisher's own outcome comes first.
    pub fn settle(&mut self, first_finisher: Seat) -> Vec<BonusOutcome> {
        let mut outcomes = Vec::new();
        let own = self.call(first_finisher);
        if own.is_called() {
            outcomes.push(BonusOutcome {
                seat: first_finisher,
                call: own,
                succeeded: true,
            });
        }
        for seat in Seat::LOOP {
            let call = self.call(seat);
            if seat != first_finisher && call.is_called() {
                outcomes.push(BonusOutcome {
                    seat,
                    call,
                    succeeded: false,
                });
            }
        }
        self.clear();
        outcomes
    }
}
