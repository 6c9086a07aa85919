//! Errors returned by league operations.

use crate::models::{GamedayId, LeagueId, MatchId, PlayerId};

/// Broad category of a [`LeagueError`], used by outer layers to pick a status code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    PreconditionViolated,
    InsufficientPlayers,
    InvalidMatchState,
    InvalidInput,
    Store,
}

/// Errors that can occur during league operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LeagueError {
    #[error("league not found: {0}")]
    LeagueNotFound(LeagueId),

    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("gameday not found: {0}")]
    GamedayNotFound(GamedayId),

    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("plan for gameday {0} was already generated")]
    PlanAlreadyGenerated(GamedayId),

    #[error("gameday {0} is already finished")]
    GamedayAlreadyFinished(GamedayId),

    #[error("no plan has been generated for gameday {0} yet")]
    PlanNotGenerated(GamedayId),

    /// Not enough players to build a match, or to satisfy the attendance minimum.
    #[error("need at least {required} players, found {found}")]
    InsufficientPlayers { required: usize, found: usize },

    /// A match cannot be settled (incomplete team, zero combined score).
    #[error("invalid match state: {0}")]
    InvalidMatchState(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The record store failed to persist or load a record.
    #[error("store error: {0}")]
    Store(String),

    #[error("import error: {0}")]
    Import(String),
}

impl LeagueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LeagueNotFound(_)
            | Self::PlayerNotFound(_)
            | Self::GamedayNotFound(_)
            | Self::MatchNotFound(_) => ErrorKind::NotFound,
            Self::PlanAlreadyGenerated(_)
            | Self::GamedayAlreadyFinished(_)
            | Self::PlanNotGenerated(_) => ErrorKind::PreconditionViolated,
            Self::InsufficientPlayers { .. } => ErrorKind::InsufficientPlayers,
            Self::InvalidMatchState(_) => ErrorKind::InvalidMatchState,
            Self::InvalidInput(_) | Self::Import(_) => ErrorKind::InvalidInput,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}

impl From<csv::Error> for LeagueError {
    fn from(e: csv::Error) -> Self {
        LeagueError::Import(e.to_string())
    }
}
