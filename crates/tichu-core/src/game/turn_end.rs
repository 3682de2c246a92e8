//! What happens when a player empties their hand: bonus-call judging on the
//! first finish, and the two ways a turn can end.

use crate::game::events::GameEvent;
use crate::game::match_state::{MatchState, Phase};
use crate::model::card::Card;
use crate::model::player::{Seat, Team};
use crate::model::score::{TEAM_FINISH_BONUS, card_points};
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnProgress {
    Continues,
    Ended,
}

/// Books `seat` as finished and applies whatever that triggers.
pub(crate) fn record_finish(
    state: &mut MatchState,
    seat: Seat,
    events: &mut Vec<GameEvent>,
) -> TurnProgress {
    let first_out = state.finished.is_empty();
    state.finished.push(seat);

    if first_out {
        settle_bonus_calls(state, seat, events);
    }

    if state.finished.len() == Seat::LOOP.len() - 1 {
        normal_end(state, events);
        return TurnProgress::Ended;
    }

    let team_finish = match state.finished.as_slice() {
        [one, two] if one.team() == two.team() => Some(one.team()),
        _ => None,
    };
    if let Some(team) = team_finish {
        team_end(state, team, events);
        return TurnProgress::Ended;
    }

    TurnProgress::Continues
}

fn settle_bonus_calls(state: &mut MatchState, finisher: Seat, events: &mut Vec<GameEvent>) {
    for outcome in state.bonus.settle(finisher) {
        state.scores.add(outcome.seat.team(), outcome.points());
        let player = state.player(outcome.seat).clone();
        event!(
            target: "tichu_core::engine",
            Level::INFO,
            turn = state.turn_number,
            seat = %outcome.seat,
            call = outcome.call.label(),
            succeeded = outcome.succeeded,
            points = outcome.points(),
            "bonus call resolved"
        );
        events.push(if outcome.succeeded {
            GameEvent::BonusCompleted {
                player,
                call: outcome.call,
            }
        } else {
            GameEvent::BonusFailed {
                player,
                call: outcome.call,
            }
        });
    }
}

/// Three players are out. The last one forfeits their hand and everything
/// they collected to the opposing team; their partner keeps their own pile.
fn normal_end(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    let Some(loser) = Seat::LOOP
        .iter()
        .copied()
        .find(|seat| !state.finished.contains(seat))
    else {
        return;
    };
    let winners = loser.team().other();

    let mut winning_pile: Vec<Card> = std::mem::take(&mut state.cards_played_this_turn);
    winning_pile.extend_from_slice(&state.collected[loser.index()]);
    for member in winners.members() {
        winning_pile.extend_from_slice(&state.collected[member.index()]);
    }
    winning_pile.extend(state.hands[loser.index()].clear());
    let losing_pile = &state.collected[loser.partner().index()];

    let winning_points = card_points(&winning_pile);
    let losing_points = card_points(losing_pile);
    state.scores.add(winners, winning_points);
    state.scores.add(loser.team(), losing_points);

    event!(
        target: "tichu_core::engine",
        Level::INFO,
        turn = state.turn_number,
        loser = %loser,
        winning_points,
        losing_points,
        "turn ended"
    );
    close_turn(state);
    events.push(GameEvent::TurnEnded);
}

fn team_end(state: &mut MatchState, team: Team, events: &mut Vec<GameEvent>) {
    state.scores.add(team, TEAM_FINISH_BONUS);
    event!(
        target: "tichu_core::engine",
        Level::INFO,
        turn = state.turn_number,
        team = team.index(),
        "turn ended with a team finish"
    );
    close_turn(state);
    events.push(GameEvent::TeamFinished);
}

fn close_turn(state: &mut MatchState) {
    for hand in state.hands.iter_mut() {
        hand.clear();
    }
    state.current_trick = None;
    state.on_play = None;
    state.pass_count = 0;
    state.pending_dragon_transfer = false;
    state.acknowledged = [false; 4];
    state.phase = Phase::TurnEnd;
}
