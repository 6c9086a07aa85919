//! In-memory record store, kept in insertion order.

use super::{Collection, RecordStore};
use crate::models::{
    GameMatch, Gameday, GamedayId, League, LeagueError, LeagueId, MatchId, Player, PlayerId,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Rows by id plus the order they were first inserted in.
#[derive(Clone, Debug)]
struct Table<T> {
    order: Vec<Uuid>,
    rows: HashMap<Uuid, T>,
}

impl<T: Clone> Table<T> {
    fn get(&self, id: Uuid) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id))
            .cloned()
            .collect()
    }

    fn upsert(&mut self, id: Uuid, row: T) {
        if self.rows.insert(id, row).is_none() {
            self.order.push(id);
        }
    }

    fn clear(&mut self) -> usize {
        let n = self.rows.len();
        self.rows.clear();
        self.order.clear();
        n
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }
}

/// Store holding every collection in memory. Used by the web binary and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    leagues: Table<League>,
    players: Table<Player>,
    gamedays: Table<Gameday>,
    matches: Table<GameMatch>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn league(&self, id: LeagueId) -> Option<League> {
        self.leagues.get(id)
    }

    fn player(&self, id: PlayerId) -> Option<Player> {
        self.players.get(id)
    }

    fn gameday(&self, id: GamedayId) -> Option<Gameday> {
        self.gamedays.get(id)
    }

    fn game_match(&self, id: MatchId) -> Option<GameMatch> {
        self.matches.get(id)
    }

    fn leagues(&self) -> Vec<League> {
        self.leagues.all()
    }

    fn players(&self) -> Vec<Player> {
        self.players.all()
    }

    fn gamedays(&self) -> Vec<Gameday> {
        self.gamedays.all()
    }

    fn matches(&self) -> Vec<GameMatch> {
        self.matches.all()
    }

    fn save_league(&mut self, league: &League) -> Result<(), LeagueError> {
        self.leagues.upsert(league.id, league.clone());
        Ok(())
    }

    fn save_player(&mut self, player: &Player) -> Result<(), LeagueError> {
        self.players.upsert(player.id, player.clone());
        Ok(())
    }

    fn save_gameday(&mut self, gameday: &Gameday) -> Result<(), LeagueError> {
        self.gamedays.upsert(gameday.id, gameday.clone());
        Ok(())
    }

    fn save_match(&mut self, game_match: &GameMatch) -> Result<(), LeagueError> {
        self.matches.upsert(game_match.id, game_match.clone());
        Ok(())
    }

    fn purge(&mut self, collection: Collection) -> Result<usize, LeagueError> {
        let removed = match collection {
            Collection::Leagues => self.leagues.clear(),
            Collection::Players => self.players.clear(),
            Collection::Gamedays => self.gamedays.clear(),
            Collection::Matches => self.matches.clear(),
        };
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_keeps_insertion_order_across_updates() {
        let mut store = MemoryStore::new();
        let a = Player::new("A");
        let mut b = Player::new("B");
        store.save_player(&a).unwrap();
        store.save_player(&b).unwrap();
        b.global_elo = 1600.0;
        store.save_player(&b).unwrap();

        let names: Vec<_> = store.players().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(store.player(b.id).map(|p| p.global_elo), Some(1600.0));
    }

    #[test]
    fn purge_clears_one_collection() {
        let mut store = MemoryStore::new();
        store.save_player(&Player::new("A")).unwrap();
        store.save_league(&League::new("L", 0)).unwrap();
        assert_eq!(store.purge(Collection::Players).unwrap(), 1);
        assert!(store.players().is_empty());
        assert_eq!(store.leagues().len(), 1);
    }
}
