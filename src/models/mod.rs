//! Data structures for the league: players, leagues, gamedays, matches.

mod error;
mod game;
mod gameday;
mod league;
mod player;

pub use error::{ErrorKind, LeagueError};
pub use game::{GameMatch, MatchId, Team};
pub use gameday::{Gameday, GamedayId, GamedayRanking, GamedayState};
pub use league::{League, LeagueId, DEFAULT_K_FACTOR};
pub use player::{
    EloHistoryEntry, Player, PlayerId, PlayerLeagueStat, PlayerStatus, DEFAULT_ELO,
};
