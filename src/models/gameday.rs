//! Gameday and GamedayState.

use crate::models::error::LeagueError;
use crate::models::game::MatchId;
use crate::models::league::LeagueId;
use crate::models::player::PlayerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a gameday.
pub type GamedayId = Uuid;

/// Lifecycle of a gameday. Transitions only move forward.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamedayState {
    /// Attendance may still change; no matches exist yet.
    #[default]
    Created,
    /// Matches generated; scores are being entered.
    PlanGenerated,
    /// Elo settled, stats and rankings recomputed. Read-only from here on.
    Finished,
}

/// One player's result summary for a finished gameday.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GamedayRanking {
    pub rank: u32,
    pub player_id: PlayerId,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_percentage: f64,
    pub elo_start: f64,
    pub elo_end: f64,
    pub elo_gain: f64,
}

/// A single day's event: several doubles matches across multiple courts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gameday {
    pub id: GamedayId,
    pub title: String,
    pub date: NaiveDate,
    pub league: LeagueId,
    pub courts_count: u32,
    pub games_per_court: u32,
    /// Attending players, in the order they were added.
    pub present_players: Vec<PlayerId>,
    pub state: GamedayState,
    /// Generated matches, in creation order.
    pub matches: Vec<MatchId>,
    /// Written once at finalization.
    pub gameday_rankings: Vec<GamedayRanking>,
}

impl Gameday {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        league: LeagueId,
        courts_count: u32,
        games_per_court: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date,
            league,
            courts_count,
            games_per_court,
            present_players: Vec::new(),
            state: GamedayState::Created,
            matches: Vec::new(),
            gameday_rankings: Vec::new(),
        }
    }

    /// Number of matches a full plan contains (courts x games per court).
    pub fn total_matches(&self) -> usize {
        self.courts_count as usize * self.games_per_court as usize
    }

    pub fn generated_plan(&self) -> bool {
        self.state != GamedayState::Created
    }

    pub fn is_finished(&self) -> bool {
        self.state == GamedayState::Finished
    }

    pub fn is_present(&self, player_id: PlayerId) -> bool {
        self.present_players.contains(&player_id)
    }

    /// Guard for plan generation: only a `Created` gameday may get a plan.
    pub fn ensure_plan_pending(&self) -> Result<(), LeagueError> {
        match self.state {
            GamedayState::Created => Ok(()),
            GamedayState::PlanGenerated => Err(LeagueError::PlanAlreadyGenerated(self.id)),
            GamedayState::Finished => Err(LeagueError::GamedayAlreadyFinished(self.id)),
        }
    }

    /// Guard for finalization: the plan must exist and the day must still be open.
    pub fn ensure_finalizable(&self) -> Result<(), LeagueError> {
        match self.state {
            GamedayState::Created => Err(LeagueError::PlanNotGenerated(self.id)),
            GamedayState::PlanGenerated => Ok(()),
            GamedayState::Finished => Err(LeagueError::GamedayAlreadyFinished(self.id)),
        }
    }

    /// `Created -> PlanGenerated`, storing the created match ids.
    pub fn record_plan(&mut self, matches: Vec<MatchId>) -> Result<(), LeagueError> {
        self.ensure_plan_pending()?;
        self.matches = matches;
        self.state = GamedayState::PlanGenerated;
        Ok(())
    }

    /// `PlanGenerated -> Finished`, storing the day's ranking snapshot.
    pub fn record_finish(&mut self, rankings: Vec<GamedayRanking>) -> Result<(), LeagueError> {
        self.ensure_finalizable()?;
        self.gameday_rankings = rankings;
        self.state = GamedayState::Finished;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gameday() -> Gameday {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default();
        Gameday::new("Gameday 1", date, Uuid::new_v4(), 2, 3)
    }

    #[test]
    fn transitions_only_move_forward() {
        let mut g = gameday();
        assert_eq!(g.total_matches(), 6);
        assert!(matches!(g.ensure_finalizable(), Err(LeagueError::PlanNotGenerated(_))));

        g.record_plan(vec![Uuid::new_v4()]).unwrap();
        assert!(g.generated_plan());
        assert!(matches!(
            g.record_plan(Vec::new()),
            Err(LeagueError::PlanAlreadyGenerated(_))
        ));
        assert_eq!(g.matches.len(), 1);

        g.record_finish(Vec::new()).unwrap();
        assert!(g.is_finished());
        assert!(matches!(
            g.record_finish(Vec::new()),
            Err(LeagueError::GamedayAlreadyFinished(_))
        ));
    }
}
