//! Doubles match, its teams and the Elo snapshots written at settlement.

use crate::models::gameday::GamedayId;
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[default]
    A,
    B,
}

/// A single doubles match. Created by plan generation, scored externally,
/// settled exactly once when its gameday is finalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub title: String,
    pub gameday: GamedayId,
    /// Team A player ids (2 in doubles).
    pub team_a: Vec<PlayerId>,
    /// Team B player ids.
    pub team_b: Vec<PlayerId>,
    pub score_a: u32,
    pub score_b: u32,
    pub is_played: bool,
    /// Rating change applied to team A (team B got the negation). None until settled.
    pub elo_delta: Option<f64>,
    pub team_a_elo_before: Vec<f64>,
    pub team_a_elo_after: Vec<f64>,
    pub team_b_elo_before: Vec<f64>,
    pub team_b_elo_after: Vec<f64>,
}

impl GameMatch {
    pub fn new(
        title: impl Into<String>,
        gameday: GamedayId,
        team_a: Vec<PlayerId>,
        team_b: Vec<PlayerId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            gameday,
            team_a,
            team_b,
            score_a: 0,
            score_b: 0,
            is_played: false,
            elo_delta: None,
            team_a_elo_before: Vec::new(),
            team_a_elo_after: Vec::new(),
            team_b_elo_before: Vec::new(),
            team_b_elo_after: Vec::new(),
        }
    }

    /// Side the player is on, if they play in this match.
    pub fn team_of(&self, player_id: PlayerId) -> Option<Team> {
        if self.team_a.contains(&player_id) {
            Some(Team::A)
        } else if self.team_b.contains(&player_id) {
            Some(Team::B)
        } else {
            None
        }
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.team_of(player_id).is_some()
    }

    /// Winning side by strict score comparison; None for a tie.
    pub fn winner(&self) -> Option<Team> {
        match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => Some(Team::A),
            std::cmp::Ordering::Less => Some(Team::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Rating the player had before this match was settled, if recorded.
    pub fn elo_before(&self, player_id: PlayerId) -> Option<f64> {
        let (team, before) = match self.team_of(player_id)? {
            Team::A => (&self.team_a, &self.team_a_elo_before),
            Team::B => (&self.team_b, &self.team_b_elo_before),
        };
        let idx = team.iter().position(|&p| p == player_id)?;
        before.get(idx).copied()
    }
}
