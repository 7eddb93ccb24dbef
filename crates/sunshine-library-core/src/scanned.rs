// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Scanned games repository
//
// Lookup is by `unique_id`, removal is by content key `id`. Frontends rely
// on that split: they remove what the last scan reported missing, and they
// reference entries they display by their stable id.

use crate::reconcile::{apply_sync_result, sync_scanned_games};
use crate::store::{keys, Store, StoreExt};
use crate::types::{CoreError, CoreResult, GameRecord, ScannedGameEntry, SyncResult};
use std::collections::HashSet;
use std::sync::Arc;

/// CRUD over the persisted scanned games
pub struct ScannedGamesRepository {
    store: Arc<dyn Store>,
}

impl ScannedGamesRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get all scanned games, empty if none were ever stored
    pub fn get_all(&self) -> CoreResult<Vec<ScannedGameEntry>> {
        self.store.load_or_default(keys::SCANNED_GAMES)
    }

    /// Get a scanned game by its stable id
    pub fn get_by_id(&self, unique_id: &str) -> CoreResult<ScannedGameEntry> {
        self.get_all()?
            .into_iter()
            .find(|game| game.unique_id == unique_id)
            .ok_or_else(|| CoreError::NotFound(format!("Scanned game not found: {}", unique_id)))
    }

    /// Replace the whole collection
    pub fn set_all(&self, games: &[ScannedGameEntry]) -> CoreResult<()> {
        check_unique(games)?;
        self.store.save(keys::SCANNED_GAMES, games)?;
        tracing::info!("Stored {} scanned games", games.len());
        Ok(())
    }

    /// Remove every entry whose content key is in `ids`
    pub fn remove_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> CoreResult<()> {
        if ids.is_empty() {
            return Err(CoreError::InvalidInput(
                "Invalid game IDs provided".to_string(),
            ));
        }
        let ids: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();

        let mut games = self.get_all()?;
        let before = games.len();
        games.retain(|game| !ids.contains(game.id.as_str()));

        self.store.save(keys::SCANNED_GAMES, &games)?;
        tracing::info!("Removed {} scanned games", before - games.len());
        Ok(())
    }

    /// Diff a fresh scan against the stored games without persisting
    pub fn sync(&self, new_scan: &[GameRecord]) -> CoreResult<SyncResult> {
        let stored = self.get_all()?;
        sync_scanned_games(new_scan, &stored)
    }

    /// Fold a diff into the stored games and persist the result
    pub fn apply(&self, result: &SyncResult) -> CoreResult<()> {
        let stored = self.get_all()?;
        let games = apply_sync_result(stored, result);
        self.store.save(keys::SCANNED_GAMES, &games)?;
        tracing::info!("Applied scan: {}", result.summary());
        Ok(())
    }

    /// Diff and apply in one read-modify-write.
    ///
    /// Nothing is written when the scan is rejected or changes nothing.
    pub fn rescan(&self, new_scan: &[GameRecord]) -> CoreResult<SyncResult> {
        let stored = self.get_all()?;
        let result = sync_scanned_games(new_scan, &stored)?;
        if result.is_empty() {
            tracing::info!("Scan found no changes");
            return Ok(result);
        }

        let games = apply_sync_result(stored, &result);
        self.store.save(keys::SCANNED_GAMES, &games)?;
        tracing::info!("Applied scan: {}", result.summary());
        Ok(result)
    }
}

fn check_unique(games: &[ScannedGameEntry]) -> CoreResult<()> {
    let mut ids = HashSet::with_capacity(games.len());
    let mut unique_ids = HashSet::with_capacity(games.len());
    for game in games {
        if !ids.insert(game.id.as_str()) {
            return Err(CoreError::InvalidInput(format!(
                "Duplicate scanned game id: {}",
                game.id
            )));
        }
        if !unique_ids.insert(game.unique_id.as_str()) {
            return Err(CoreError::InvalidInput(format!(
                "Duplicate scanned game unique id: {}",
                game.unique_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repository() -> ScannedGamesRepository {
        ScannedGamesRepository::new(Arc::new(MemoryStore::new()))
    }

    fn entry(id: &str, unique_id: &str) -> ScannedGameEntry {
        ScannedGameEntry {
            id: id.to_string(),
            unique_id: unique_id.to_string(),
            is_steam_game: false,
            game_details: GameRecord::new(id, id.to_uppercase()),
        }
    }

    #[test]
    fn test_get_all_defaults_to_empty() {
        assert!(repository().get_all().unwrap().is_empty());
    }

    #[test]
    fn test_get_by_unique_id() {
        let repo = repository();
        repo.set_all(&[entry("a", "u-a"), entry("b", "u-b")]).unwrap();

        assert_eq!(repo.get_by_id("u-b").unwrap().id, "b");
        assert!(matches!(repo.get_by_id("b"), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_set_all_rejects_duplicates() {
        let repo = repository();
        let err = repo.set_all(&[entry("a", "u-1"), entry("a", "u-2")]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        let err = repo.set_all(&[entry("a", "u-1"), entry("b", "u-1")]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_remove_by_content_key() {
        let repo = repository();
        repo.set_all(&[entry("a", "u-a"), entry("b", "u-b"), entry("c", "u-c")]).unwrap();

        repo.remove_by_ids(&["a", "c"]).unwrap();
        let remaining = repo.get_all().unwrap();
        assert_eq!(remaining, vec![entry("b", "u-b")]);

        // Stable ids are not content keys; nothing matches
        repo.remove_by_ids(&["u-b"]).unwrap();
        assert_eq!(repo.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_requires_ids() {
        let repo = repository();
        let none: [&str; 0] = [];
        assert!(matches!(
            repo.remove_by_ids(&none),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sync_then_apply() {
        let repo = repository();
        let scan = vec![GameRecord::new("steam://play/10", "Game A").with_app_id("10")];

        let result = repo.sync(&scan).unwrap();
        assert!(repo.get_all().unwrap().is_empty());

        repo.apply(&result).unwrap();
        let games = repo.get_all().unwrap();
        assert_eq!(games.len(), 1);
        assert!(games[0].is_steam_game);
        assert_eq!(games[0].unique_id, result.to_add[0].unique_id);
    }

    #[test]
    fn test_rescan_rejects_empty_scan() {
        let repo = repository();
        repo.set_all(&[entry("a", "u-a")]).unwrap();

        assert!(matches!(repo.rescan(&[]), Err(CoreError::InvalidInput(_))));
        assert_eq!(repo.get_all().unwrap(), vec![entry("a", "u-a")]);
    }
}
