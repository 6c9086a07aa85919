//! Player registration, league rosters and CSV import.

use crate::models::{League, LeagueError, LeagueId, Player, PlayerId, PlayerStatus, DEFAULT_ELO};
use crate::store::{Collection, RecordStore};
use serde::Deserialize;
use std::io::Read;

/// Register a player. Names are trimmed and must be unique (case-insensitive).
///
/// # Errors
/// `InvalidInput` for an empty or duplicate name; a store failure.
pub fn register_player<S: RecordStore>(
    store: &mut S,
    name: &str,
    elo: Option<f64>,
) -> Result<Player, LeagueError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeagueError::InvalidInput("player name is empty".into()));
    }
    let is_duplicate = store
        .players()
        .iter()
        .any(|p| p.name.eq_ignore_ascii_case(name));
    if is_duplicate {
        return Err(LeagueError::InvalidInput(format!("a player named '{name}' already exists")));
    }
    let player = Player::with_elo(name, elo.unwrap_or(DEFAULT_ELO));
    store.save_player(&player)?;
    Ok(player)
}

/// Add players to a league's roster, ignoring ones already on it.
///
/// # Errors
/// `LeagueNotFound`, `PlayerNotFound`; a store failure.
pub fn add_to_roster<S: RecordStore>(
    store: &mut S,
    league_id: LeagueId,
    player_ids: &[PlayerId],
) -> Result<League, LeagueError> {
    let mut league = store.require_league(league_id)?;
    for &id in player_ids {
        store.require_player(id)?;
        if !league.players.contains(&id) {
            league.players.push(id);
        }
    }
    store.save_league(&league)?;
    Ok(league)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    #[serde(default)]
    elo: Option<f64>,
    #[serde(default)]
    status: Option<PlayerStatus>,
}

/// Parse players from CSV with a `name,elo,status` header. `elo` defaults to
/// 1500 and `status` (`active`/`inactive`) to active.
///
/// # Errors
/// `Import` on malformed CSV or a blank name.
pub fn parse_players_csv<R: Read>(reader: R) -> Result<Vec<Player>, LeagueError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut players = Vec::new();
    for row in rdr.deserialize::<RosterRow>() {
        let row = row?;
        if row.name.is_empty() {
            return Err(LeagueError::Import(format!(
                "row {} has an empty name",
                players.len() + 2
            )));
        }
        let mut player = Player::with_elo(row.name, row.elo.unwrap_or(DEFAULT_ELO));
        player.player_status = row.status.unwrap_or_default();
        players.push(player);
    }
    Ok(players)
}

/// Import players from CSV, skipping names that already exist. Returns how many were added.
///
/// # Errors
/// `Import` on malformed CSV; a store failure.
pub fn import_players_csv<S: RecordStore, R: Read>(store: &mut S, reader: R) -> Result<usize, LeagueError> {
    let mut added = 0;
    for player in parse_players_csv(reader)? {
        let exists = store
            .players()
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(&player.name));
        if exists {
            log::warn!("Skipping '{}': already registered", player.name);
            continue;
        }
        store.save_player(&player)?;
        added += 1;
    }
    log::info!("Imported {added} players");
    Ok(added)
}

/// Administrative bulk delete of one collection. Returns how many records were removed.
///
/// # Errors
/// A store failure.
pub fn purge_collection<S: RecordStore>(store: &mut S, collection: Collection) -> Result<usize, LeagueError> {
    let removed = store.purge(collection)?;
    log::warn!("Deleted {removed} records from {collection:?}");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn csv_defaults_and_status() {
        let data = "name,elo,status\nAnna, 1620.5 ,active\nTom,,inactive\nLea,,\n";
        let players = parse_players_csv(data.as_bytes()).unwrap();
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].global_elo, 1620.5);
        assert_eq!(players[1].global_elo, DEFAULT_ELO);
        assert_eq!(players[1].player_status, PlayerStatus::Inactive);
        assert_eq!(players[2].player_status, PlayerStatus::Active);
    }

    #[test]
    fn csv_rejects_bad_rating() {
        let data = "name,elo,status\nAnna,strong,active\n";
        assert!(matches!(parse_players_csv(data.as_bytes()), Err(LeagueError::Import(_))));
    }

    #[test]
    fn import_skips_existing_names() {
        let mut store = MemoryStore::new();
        register_player(&mut store, "anna", None).unwrap();
        let data = "name,elo,status\nAnna,1600,active\nTom,1400,active\n";
        assert_eq!(import_players_csv(&mut store, data.as_bytes()).unwrap(), 1);
        assert_eq!(store.players().len(), 2);
    }

    #[test]
    fn register_rejects_blank_and_duplicate_names() {
        let mut store = MemoryStore::new();
        register_player(&mut store, " Max ", Some(1550.0)).unwrap();
        assert!(matches!(register_player(&mut store, "  ", None), Err(LeagueError::InvalidInput(_))));
        assert!(matches!(register_player(&mut store, "MAX", None), Err(LeagueError::InvalidInput(_))));
        assert_eq!(store.players()[0].name, "Max");
    }

    #[test]
    fn roster_additions_are_deduplicated() {
        let mut store = MemoryStore::new();
        let league = League::new("L", 0);
        store.save_league(&league).unwrap();
        let p = register_player(&mut store, "P", None).unwrap();
        let updated = add_to_roster(&mut store, league.id, &[p.id, p.id]).unwrap();
        assert_eq!(updated.players, vec![p.id]);
    }
}
