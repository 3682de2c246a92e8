//! The phases where all four players answer before the table moves on:
//! the two bonus windows, the card exchange and the end-of-turn acknowledgement.

use crate::game::bonus::BonusCall;
use crate::game::error::EngineError;
use crate::game::events::GameEvent;
use crate::game::match_state::{MatchState, Phase};
use crate::model::card::Card;
use crate::model::player::Seat;
use tracing::{Level, event};

pub(crate) fn call_bonus(
    state: &mut MatchState,
    seat: Seat,
    big: bool,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    ensure_bonus_window(state, seat)?;
    let committed = state.bonus.call(seat);

    let call = match (state.phase, big) {
        (Phase::BigBonus, true) => BonusCall::Big,
        // Re-affirming a committed big call.
        (Phase::SmallBonus, true) if committed == BonusCall::Big => BonusCall::Big,
        (Phase::SmallBonus, false) if committed != BonusCall::Big => BonusCall::Small,
        _ => return Err(EngineError::OutOfTurn),
    };

    state.bonus.record(seat, call);
    if call != committed {
        events.push(GameEvent::BonusCalled {
            player: state.player(seat).clone(),
            call,
        });
    }
    advance_bonus_window(state);
    Ok(())
}

pub(crate) fn pass_bonus(state: &mut MatchState, seat: Seat) -> Result<(), EngineError> {
    ensure_bonus_window(state, seat)?;
    state.bonus.record(seat, BonusCall::None);
    advance_bonus_window(state);
    Ok(())
}

fn ensure_bonus_window(state: &MatchState, seat: Seat) -> Result<(), EngineError> {
    if !matches!(state.phase, Phase::BigBonus | Phase::SmallBonus) {
        return Err(EngineError::OutOfTurn);
    }
    if state.bonus.has_responded(seat) {
        return Err(EngineError::AlreadyResponded);
    }
    Ok(())
}

fn advance_bonus_window(state: &mut MatchState) {
    if !state.bonus.window_complete() {
        return;
    }
    let next = match state.phase {
        Phase::BigBonus => Phase::SmallBonus,
        _ => Phase::Exchange,
    };
    event!(
        target: "tichu_core::engine",
        Level::DEBUG,
        turn = state.turn_number,
        from = %state.phase,
        to = %next,
        "bonus window closed"
    );
    state.bonus.open_window();
    state.phase = next;
}

pub(crate) fn submit_exchange(
    state: &mut MatchState,
    seat: Seat,
    cards: &[Card],
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    if state.phase != Phase::Exchange {
        return Err(EngineError::OutOfTurn);
    }
    if state.exchange.has_submitted(seat) {
        return Err(EngineError::AlreadyResponded);
    }
    state
        .exchange
        .submit(seat, cards, &state.hands[seat.index()])?;

    if !state.exchange.is_complete() {
        return Ok(());
    }

    let exchange = std::mem::take(&mut state.exchange);
    exchange.apply(&mut state.hands)?;

    let starter = state.holder_of(Card::Mahjong).unwrap_or(Seat::North);
    state.phase = Phase::Play;
    state.on_play = Some(starter);
    event!(
        target: "tichu_core::engine",
        Level::DEBUG,
        turn = state.turn_number,
        starter = %starter,
        "cards exchanged"
    );
    events.push(GameEvent::CardsExchanged {
        starter: state.player(starter).clone(),
    });
    Ok(())
}

pub(crate) fn acknowledge_turn_end(
    state: &mut MatchState,
    seat: Seat,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    if state.phase != Phase::TurnEnd {
        return Err(EngineError::OutOfTurn);
    }
    if state.acknowledged[seat.index()] {
        return Err(EngineError::AlreadyResponded);
    }
    state.acknowledged[seat.index()] = true;

    if state.acknowledged.iter().all(|done| *done) {
        state.deal_next_turn();
        event!(
            target: "tichu_core::engine",
            Level::INFO,
            turn = state.turn_number,
            scores = ?state.scores.standings(),
            "new turn dealt"
        );
        events.push(GameEvent::NewTurn);
    }
    Ok(())
}
