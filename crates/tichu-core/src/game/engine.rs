//! Applies one player intent to a match and produces the replacement state.

use crate::game::error::EngineError;
use crate::game::events::GameEvent;
use crate::game::intent::Intent;
use crate::game::match_state::{MatchState, Phase};
use crate::game::turn_end::{self, TurnProgress};
use crate::game::windows;
use crate::model::card::Card;
use crate::model::combination::{Combination, CombinationKind, is_legal_play};
use crate::model::player::{PlayerId, Seat};
use crate::model::trick::Trick;
use tracing::{Level, event};

/// An accepted intent: the state to broadcast plus what to tell the table.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: MatchState,
    pub events: Vec<GameEvent>,
}

impl Transition {
    pub fn messages(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

/// A refused intent. `state` is the untouched input, to be echoed back to the
/// acting player only.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub error: EngineError,
    pub state: MatchState,
}

pub fn apply(
    state: &MatchState,
    player: &PlayerId,
    intent: Intent,
) -> Result<Transition, Rejection> {
    let label = intent.label();
    let mut next = state.clone();
    let mut events = Vec::new();

    match dispatch(&mut next, player, intent, &mut events) {
        Ok(()) => {
            event!(
                target: "tichu_core::engine",
                Level::DEBUG,
                player = %player,
                intent = label,
                phase = %next.phase(),
                turn = next.turn_number(),
                events = events.len(),
                "intent accepted"
            );
            Ok(Transition {
                state: next,
                events,
            })
        }
        Err(error) => {
            event!(
                target: "tichu_core::engine",
                Level::DEBUG,
                player = %player,
                intent = label,
                phase = %state.phase(),
                error = %error,
                "intent rejected"
            );
            Err(Rejection {
                error,
                state: state.clone(),
            })
        }
    }
}

fn dispatch(
    state: &mut MatchState,
    player: &PlayerId,
    intent: Intent,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let seat = state
        .seat_of(player)
        .ok_or_else(|| EngineError::UnknownPlayer(player.clone()))?;

    match intent {
        Intent::CallBonus { big } => windows::call_bonus(state, seat, big, events),
        Intent::PassBonus => windows::pass_bonus(state, seat),
        Intent::SubmitExchange { cards } => windows::submit_exchange(state, seat, &cards, events),
        Intent::AcknowledgeTurnEnd => windows::acknowledge_turn_end(state, seat, events),
        Intent::Play { cards, claimed } => play(state, seat, cards, claimed, events),
        Intent::Pass => pass(state, seat, events),
        Intent::PlayDog => play_dog(state, seat, events),
        Intent::SendTrick { recipient } => send_trick(state, seat, &recipient, events),
    }
}

fn ensure_on_play(state: &MatchState, seat: Seat) -> Result<(), EngineError> {
    if state.phase != Phase::Play || state.pending_dragon_transfer || state.on_play != Some(seat) {
        return Err(EngineError::OutOfTurn);
    }
    Ok(())
}

fn play(
    state: &mut MatchState,
    seat: Seat,
    cards: Vec<Card>,
    claimed: CombinationKind,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    ensure_on_play(state, seat)?;

    let hand = &state.hands[seat.index()];
    if let Some(missing) = cards.iter().copied().find(|card| !hand.contains(*card)) {
        return Err(EngineError::CardNotInHand(missing));
    }
    for (index, card) in cards.iter().enumerate() {
        if cards[..index].contains(card) {
            return Err(EngineError::IllegalCombination);
        }
    }

    let table = state.current_trick.as_ref().map(Trick::combination);
    let combination =
        Combination::from_cards(cards, table).ok_or(EngineError::IllegalCombination)?;
    if combination.kind() != claimed {
        return Err(EngineError::IllegalCombination);
    }
    if !is_legal_play(&combination, table) {
        return Err(EngineError::IllegalPlay);
    }

    state.hands[seat.index()].remove_all(combination.cards());
    state
        .cards_played_this_turn
        .extend_from_slice(combination.cards());
    events.push(GameEvent::Played {
        player: state.player(seat).clone(),
        cards: combination.cards().to_vec(),
    });
    state.current_trick = Some(Trick::new(seat, combination));
    state.pass_count = 0;

    if state.hands[seat.index()].is_empty()
        && turn_end::record_finish(state, seat, events) == TurnProgress::Ended
    {
        return Ok(());
    }

    state.on_play = Some(state.next_active_after(seat));
    Ok(())
}

/// The pass that closes a trick announces only the collection or the
/// Dragon prompt, not the pass itself.
fn pass(
    state: &mut MatchState,
    seat: Seat,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    ensure_on_play(state, seat)?;
    let holder = state
        .current_trick
        .as_ref()
        .map(Trick::played_by)
        .ok_or(EngineError::EmptyTable)?;

    state.pass_count += 1;

    // A holder who went out with the trick cannot answer it, so every active seat must pass.
    let active = state.active_count();
    let needed = if state.has_finished(holder) {
        active
    } else {
        active - 1
    };

    if usize::from(state.pass_count) >= needed {
        close_trick(state, holder, events);
    } else {
        state.on_play = Some(state.next_active_after(seat));
        events.push(GameEvent::Passed {
            player: state.player(seat).clone(),
        });
    }
    Ok(())
}

fn close_trick(state: &mut MatchState, holder: Seat, events: &mut Vec<GameEvent>) {
    if state.cards_played_this_turn.contains(&Card::Dragon) {
        state.pending_dragon_transfer = true;
        state.on_play = Some(holder);
        event!(
            target: "tichu_core::engine",
            Level::DEBUG,
            seat = %holder,
            "dragon trick awaiting recipient"
        );
        events.push(GameEvent::DragonTrickPending);
        return;
    }
    collect_trick(state, holder, holder, events);
}

/// Moves everything played since the last collection into `receiver`'s pile
/// and gives the lead to `winner`, or the next active seat if they are out.
fn collect_trick(
    state: &mut MatchState,
    winner: Seat,
    receiver: Seat,
    events: &mut Vec<GameEvent>,
) {
    let cards = std::mem::take(&mut state.cards_played_this_turn);
    state.collected[receiver.index()].extend(cards);
    state.current_trick = None;
    state.pass_count = 0;
    state.pending_dragon_transfer = false;

    let next = if state.has_finished(winner) {
        state.next_active_after(winner)
    } else {
        winner
    };
    state.on_play = Some(next);

    event!(
        target: "tichu_core::engine",
        Level::INFO,
        turn = state.turn_number,
        winner = %winner,
        receiver = %receiver,
        "trick collected"
    );
    events.push(GameEvent::TrickWon {
        receiver: state.player(receiver).clone(),
        on_play: state.player(next).clone(),
    });
}

fn play_dog(
    state: &mut MatchState,
    seat: Seat,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    ensure_on_play(state, seat)?;
    if state.current_trick.is_some() {
        return Err(EngineError::IllegalPlay);
    }
    if !state.hands[seat.index()].remove(Card::Dog) {
        return Err(EngineError::CardNotInHand(Card::Dog));
    }

    state.cards_played_this_turn.push(Card::Dog);
    events.push(GameEvent::PlayedDog {
        player: state.player(seat).clone(),
    });

    if state.hands[seat.index()].is_empty()
        && turn_end::record_finish(state, seat, events) == TurnProgress::Ended
    {
        return Ok(());
    }

    let partner = seat.partner();
    state.on_play = Some(if state.has_finished(partner) {
        state.next_active_after(partner)
    } else {
        partner
    });
    Ok(())
}

fn send_trick(
    state: &mut MatchState,
    seat: Seat,
    recipient: &PlayerId,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let holder = state.current_trick.as_ref().map(Trick::played_by);
    if state.phase != Phase::Play || !state.pending_dragon_transfer || holder != Some(seat) {
        return Err(EngineError::OutOfTurn);
    }

    let target = state
        .seat_of(recipient)
        .filter(|target| target.team() != seat.team())
        .ok_or_else(|| EngineError::InvalidRecipient(recipient.clone()))?;

    collect_trick(state, seat, target, events);
    Ok(())
}
