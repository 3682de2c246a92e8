use crate::game::exchange::ExchangeError;
use crate::model::card::Card;
use crate::model::player::PlayerId;
use thiserror::Error;

/// Why a single intent was turned down. Every variant is recoverable: the
/// state the intent was applied to stays exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cards do not form the claimed combination")]
    IllegalCombination,
    #[error("combination does not beat the table")]
    IllegalPlay,
    #[error("player is not entitled to act right now")]
    OutOfTurn,
    #[error("invalid exchange: {0}")]
    InvalidExchange(#[from] ExchangeError),
    #[error("{0} cannot receive this trick")]
    InvalidRecipient(PlayerId),
    #[error("{0} is not seated at this table")]
    UnknownPlayer(PlayerId),
    #[error("{0} is not in the player's hand")]
    CardNotInHand(Card),
    #[error("there is no trick on the table to pass on")]
    EmptyTable,
    #[error("player has already answered in this window")]
    AlreadyResponded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeatingError {
    #[error("{0} appears more than once in the turn order")]
    DuplicatePlayer(PlayerId),
}
