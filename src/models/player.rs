//! Player, per-league statistics and Elo history.

use crate::models::game::MatchId;
use crate::models::league::LeagueId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches, rosters and lookups).
pub type PlayerId = Uuid;

/// Rating every new player starts with.
pub const DEFAULT_ELO: f64 = 1500.0;

/// Whether a player is picked up by attendance selection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    #[default]
    Active,
    Inactive,
}

/// One Elo change, appended after every settled match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EloHistoryEntry {
    pub date: DateTime<Utc>,
    /// Rating after the match, rounded to 2 decimals.
    pub elo: f64,
    pub match_id: MatchId,
    /// League of the match's gameday.
    pub league_id: LeagueId,
}

/// Aggregated results of one player in one league.
///
/// Rebuilt wholesale from the match history on every finalization; `rank`
/// is filled in afterwards by the ranking pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerLeagueStat {
    pub league_id: LeagueId,
    pub played_gamedays: u32,
    pub match_count: u32,
    pub league_wins: u32,
    pub league_losses: u32,
    pub win_percentage: f64,
    /// None until the player has played enough gamedays to qualify.
    pub rank: Option<u32>,
}

/// A league player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub global_elo: f64,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub player_status: PlayerStatus,
    pub league_stats: Vec<PlayerLeagueStat>,
    pub elo_history: Vec<EloHistoryEntry>,
}

impl Player {
    /// Create a new active player at the default rating.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_elo(name, DEFAULT_ELO)
    }

    /// Create a new active player with a given starting rating.
    pub fn with_elo(name: impl Into<String>, elo: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            global_elo: elo,
            total_games: 0,
            wins: 0,
            losses: 0,
            player_status: PlayerStatus::Active,
            league_stats: Vec::new(),
            elo_history: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.player_status == PlayerStatus::Active
    }

    /// Stats row for a league, if the player has one.
    pub fn league_stat(&self, league_id: LeagueId) -> Option<&PlayerLeagueStat> {
        self.league_stats.iter().find(|s| s.league_id == league_id)
    }

    pub fn league_stat_mut(&mut self, league_id: LeagueId) -> Option<&mut PlayerLeagueStat> {
        self.league_stats.iter_mut().find(|s| s.league_id == league_id)
    }

    /// Matches played in a league so far (0 without a stats row). Seeds matchmaking fairness.
    pub fn league_match_count(&self, league_id: LeagueId) -> u32 {
        self.league_stat(league_id).map_or(0, |s| s.match_count)
    }
}
