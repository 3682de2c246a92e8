use crate::game::bonus::BonusCall;
use crate::model::card::Card;
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Something every player at the table should hear about. The `Display`
/// output is the message broadcast verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    BonusCalled { player: PlayerId, call: BonusCall },
    CardsExchanged { starter: PlayerId },
    Played { player: PlayerId, cards: Vec<Card> },
    Passed { player: PlayerId },
    PlayedDog { player: PlayerId },
    DragonTrickPending,
    TrickWon { receiver: PlayerId, on_play: PlayerId },
    BonusCompleted { player: PlayerId, call: BonusCall },
    BonusFailed { player: PlayerId, call: BonusCall },
    TurnEnded,
    TeamFinished,
    NewTurn,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::BonusCalled { player, call } => match call {
                BonusCall::Big => write!(f, "{player} called a grand tichu."),
                _ => write!(f, "{player} called a tichu."),
            },
            GameEvent::CardsExchanged { starter } => {
                write!(f, "Cards exchanged. {starter} has the Mahjong and starts.")
            }
            GameEvent::Played { player, cards } => {
                let listed = cards
                    .iter()
                    .map(|card| card.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{player} played {listed}.")
            }
            GameEvent::Passed { player } => write!(f, "{player} passed."),
            GameEvent::PlayedDog { player } => write!(f, "{player} played a dog."),
            GameEvent::DragonTrickPending => f.write_str(
                "You won the round, but the deck contains a dragon. Choose an opponent to send the deck to.",
            ),
            GameEvent::TrickWon { receiver, on_play } => {
                write!(f, "{receiver} has won the deck. {on_play} has the initiative.")
            }
            GameEvent::BonusCompleted { player, call } => {
                write!(f, "{player} has successfully completed a {}.", call.label())
            }
            GameEvent::BonusFailed { player, call } => {
                write!(f, "{player} has failed to complete a {}.", call.label())
            }
            GameEvent::TurnEnded => f.write_str("Turn ended."),
            GameEvent::TeamFinished => f.write_str(
                "Turn ended. Players in a team finished after each other and got 200 points!",
            ),
            GameEvent::NewTurn => f.write_str("New turn started."),
        }
    }
}
