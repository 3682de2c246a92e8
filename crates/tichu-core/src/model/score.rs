use crate::model::card::Card;
use crate::model::player::Team;
use serde::{Deserialize, Serialize};

/// Flat award for a team whose two players finish first and second.
pub const TEAM_FINISH_BONUS: i32 = 200;

/// Point value of a pile of cards. A full deck is worth exactly 100.
pub fn card_points(cards: &[Card]) -> i32 {
    cards.iter().map(|card| card.points()).sum()
}

/// Running team totals. Scores carry over from turn to turn and may go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    totals: [i32; 2],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { totals: [0; 2] }
    }

    pub fn add(&mut self, team: Team, points: i32) {
        self.totals[team.index()] += points;
    }

    pub fn set_totals(&mut self, totals: [i32; 2]) {
        self.totals = totals;
    }

    pub fn score(&self, team: Team) -> i32 {
        self.totals[team.index()]
    }

    pub fn standings(&self) -> &[i32; 2] {
        &self.totals
    }

    pub fn leading_team(&self) -> Option<Team> {
        match self.totals[0].cmp(&self.totals[1]) {
            core::cmp::Ordering::Greater => Some(Team::NorthSouth),
            core::cmp::Ordering::Less => Some(Team::EastWest),
            core::cmp::Ordering::Equal => None,
        }
    }
}
