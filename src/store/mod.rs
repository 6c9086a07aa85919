//! Record store boundary: the persistence collaborator the league logic reads from and writes to.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    GameMatch, Gameday, GamedayId, League, LeagueError, LeagueId, MatchId, Player, PlayerId,
};
use serde::{Deserialize, Serialize};

/// Record collections known to the store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Leagues,
    Players,
    Gamedays,
    Matches,
}

impl std::str::FromStr for Collection {
    type Err = LeagueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leagues" => Ok(Collection::Leagues),
            "players" => Ok(Collection::Players),
            "gamedays" => Ok(Collection::Gamedays),
            "matches" => Ok(Collection::Matches),
            other => Err(LeagueError::InvalidInput(format!("unknown collection '{other}'"))),
        }
    }
}

/// Typed access to league records.
///
/// Lookups return owned copies; callers mutate them and write them back with
/// the matching `save_*` call (insert or replace by id). Listing methods return
/// records in insertion order.
pub trait RecordStore {
    fn league(&self, id: LeagueId) -> Option<League>;
    fn player(&self, id: PlayerId) -> Option<Player>;
    fn gameday(&self, id: GamedayId) -> Option<Gameday>;
    fn game_match(&self, id: MatchId) -> Option<GameMatch>;

    fn leagues(&self) -> Vec<League>;
    fn players(&self) -> Vec<Player>;
    fn gamedays(&self) -> Vec<Gameday>;
    fn matches(&self) -> Vec<GameMatch>;

    fn save_league(&mut self, league: &League) -> Result<(), LeagueError>;
    fn save_player(&mut self, player: &Player) -> Result<(), LeagueError>;
    fn save_gameday(&mut self, gameday: &Gameday) -> Result<(), LeagueError>;
    fn save_match(&mut self, game_match: &GameMatch) -> Result<(), LeagueError>;

    /// Delete every record of a collection, returning how many were removed.
    fn purge(&mut self, collection: Collection) -> Result<usize, LeagueError>;

    /// Gamedays belonging to a league.
    fn gamedays_for_league(&self, league_id: LeagueId) -> Vec<Gameday> {
        self.gamedays()
            .into_iter()
            .filter(|g| g.league == league_id)
            .collect()
    }

    /// Matches referencing a gameday, in creation order.
    fn matches_for_gameday(&self, gameday_id: GamedayId) -> Vec<GameMatch> {
        self.matches()
            .into_iter()
            .filter(|m| m.gameday == gameday_id)
            .collect()
    }

    /// Finished gamedays whose present players include the player.
    fn finished_gamedays_with_player(&self, player_id: PlayerId) -> Vec<Gameday> {
        self.gamedays()
            .into_iter()
            .filter(|g| g.is_finished() && g.is_present(player_id))
            .collect()
    }

    /// Played matches in which the player was on either team.
    fn played_matches_with_player(&self, player_id: PlayerId) -> Vec<GameMatch> {
        self.matches()
            .into_iter()
            .filter(|m| m.is_played && m.involves(player_id))
            .collect()
    }

    fn require_league(&self, id: LeagueId) -> Result<League, LeagueError> {
        self.league(id).ok_or(LeagueError::LeagueNotFound(id))
    }

    fn require_player(&self, id: PlayerId) -> Result<Player, LeagueError> {
        self.player(id).ok_or(LeagueError::PlayerNotFound(id))
    }

    fn require_gameday(&self, id: GamedayId) -> Result<Gameday, LeagueError> {
        self.gameday(id).ok_or(LeagueError::GamedayNotFound(id))
    }

    fn require_match(&self, id: MatchId) -> Result<GameMatch, LeagueError> {
        self.game_match(id).ok_or(LeagueError::MatchNotFound(id))
    }
}
