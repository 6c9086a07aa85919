//! League: rating sensitivity, qualification threshold and roster.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a league.
pub type LeagueId = Uuid;

/// K-factor used when a league does not set one.
pub const DEFAULT_K_FACTOR: u32 = 32;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub title: String,
    /// Elo sensitivity for matches played in this league.
    pub k_factor: u32,
    /// Gamedays a player must have played to receive a numbered rank.
    pub min_game_days: u32,
    pub players: Vec<PlayerId>,
}

impl League {
    pub fn new(title: impl Into<String>, min_game_days: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            k_factor: DEFAULT_K_FACTOR,
            min_game_days,
            players: Vec::new(),
        }
    }

    pub fn with_k_factor(mut self, k_factor: u32) -> Self {
        self.k_factor = k_factor;
        self
    }
}
