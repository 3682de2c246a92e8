use crate::model::card::Card;
use crate::model::combination::CombinationKind;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Everything a seated player can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    CallBonus { big: bool },
    PassBonus,
    /// Card `i` goes to the player `i + 1` seats further along the turn order.
    SubmitExchange { cards: Vec<Card> },
    Play {
        cards: Vec<Card>,
        claimed: CombinationKind,
    },
    Pass,
    PlayDog,
    SendTrick { recipient: PlayerId },
    AcknowledgeTurnEnd,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::CallBonus { .. } => "call_bonus",
            Intent::PassBonus => "pass_bonus",
            Intent::SubmitExchange { .. } => "submit_exchange",
            Intent::Play { .. } => "play",
            Intent::Pass => "pass",
            Intent::PlayDog => "play_dog",
            Intent::SendTrick { .. } => "send_trick",
            Intent::AcknowledgeTurnEnd => "acknowledge_turn_end",
        }
    }
}
