// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Orchestration
//
// Library ties the repositories to the scanner and settings. Frontends hold
// one Library and call into it; it is not safe to interleave a rescan with
// other writes to the scanned games from another thread.

use crate::exports::ExportConfigRepository;
use crate::scanned::ScannedGamesRepository;
use crate::settings::SettingsStore;
use crate::store::{JsonFileStore, Store};
use crate::types::{
    CoreResult, ExportConfig, GameRecord, ScannedGameEntry, SunshineAppConfig, SyncResult,
};
use std::path::Path;
use std::sync::Arc;

/// Enumerates installed and user-added games
pub trait LibraryScanner {
    fn scan(&self, library_root: &Path, user_id: &str) -> CoreResult<Vec<GameRecord>>;
}

/// Application state shared by frontends
pub struct Library {
    pub settings: SettingsStore,
    pub scanned: ScannedGamesRepository,
    pub exports: ExportConfigRepository,
}

impl Library {
    /// Create a library with all repositories on the same store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            settings: SettingsStore::new(store.clone()),
            scanned: ScannedGamesRepository::new(store.clone()),
            exports: ExportConfigRepository::new(store),
        }
    }

    /// Open the library stored at the platform config location
    pub fn open_default() -> CoreResult<Self> {
        Ok(Self::new(Arc::new(JsonFileStore::open_default()?)))
    }

    /// Scan the configured Steam library and reconcile the stored games
    pub fn rescan_with(&self, scanner: &dyn LibraryScanner) -> CoreResult<SyncResult> {
        let target = self.settings.scan_target()?;
        tracing::info!("Scanning library at {:?}", target.library_root);

        let games = scanner.scan(&target.library_root, &target.user_id)?;
        tracing::info!("Scanner reported {} games", games.len());
        self.scanned.rescan(&games)
    }

    /// Create an export config from a scanned game.
    ///
    /// Without a template, one is derived from the game itself.
    pub fn export_scanned_game(
        &self,
        scanned_unique_id: &str,
        template: Option<SunshineAppConfig>,
    ) -> CoreResult<ExportConfig> {
        let entry = self.scanned.get_by_id(scanned_unique_id)?;
        let template = template.unwrap_or_else(|| SunshineAppConfig::from_scanned_game(&entry));
        self.exports
            .create(template, &entry.game_details, Some(entry.unique_id.as_str()))
    }

    /// Remove scanned games by content key.
    ///
    /// Export configs derived from them are kept: their snapshot stays
    /// usable and their back-reference simply stops resolving.
    pub fn remove_scanned_games<S: AsRef<str>>(&self, ids: &[S]) -> CoreResult<()> {
        self.scanned.remove_by_ids(ids)
    }

    /// Resolve an export config's back-reference, `None` if it dangles
    pub fn linked_scanned_game(
        &self,
        export_unique_id: &str,
    ) -> CoreResult<Option<ScannedGameEntry>> {
        let config = self.exports.get_by_id(export_unique_id)?;
        let Some(scanned_unique_id) = config.scanned_game_unique_id else {
            return Ok(None);
        };

        let linked = self
            .scanned
            .get_all()?
            .into_iter()
            .find(|entry| entry.unique_id == scanned_unique_id);
        if linked.is_none() {
            tracing::warn!(
                "Export config {} references missing scanned game {}",
                export_unique_id,
                scanned_unique_id
            );
        }
        Ok(linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{AppSettings, CoreError};

    struct FixedScanner(Vec<GameRecord>);

    impl LibraryScanner for FixedScanner {
        fn scan(&self, _library_root: &Path, _user_id: &str) -> CoreResult<Vec<GameRecord>> {
            Ok(self.0.clone())
        }
    }

    fn configured_library() -> Library {
        let library = Library::new(Arc::new(MemoryStore::new()));
        let mut settings = AppSettings::default();
        settings.steam_path = "/steam".to_string();
        settings.steam_id = "1".to_string();
        library.settings.update(&settings).unwrap();
        library
    }

    #[test]
    fn test_rescan_requires_scan_target() {
        let library = Library::new(Arc::new(MemoryStore::new()));
        let scanner = FixedScanner(vec![GameRecord::new("a", "A")]);
        assert!(matches!(
            library.rescan_with(&scanner),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rescan_with_scanner() {
        let library = configured_library();
        let scanner = FixedScanner(vec![
            GameRecord::new("steam://rungameid/10", "Game A").with_app_id("10"),
            GameRecord::new("/usr/bin/supertux2", "SuperTux").with_app_id("0"),
        ]);

        let result = library.rescan_with(&scanner).unwrap();
        assert_eq!(result.summary().added, 2);
        assert_eq!(library.scanned.get_all().unwrap().len(), 2);

        let again = library.rescan_with(&scanner).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_empty_scan_leaves_games_alone() {
        let library = configured_library();
        library
            .rescan_with(&FixedScanner(vec![GameRecord::new("a", "A")]))
            .unwrap();
        let before = library.scanned.get_all().unwrap();

        let err = library.rescan_with(&FixedScanner(Vec::new())).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(library.scanned.get_all().unwrap(), before);
    }

    #[test]
    fn test_export_survives_scanned_removal() {
        let library = configured_library();
        library
            .rescan_with(&FixedScanner(vec![
                GameRecord::new("steam://rungameid/10", "Game A").with_app_id("10")
            ]))
            .unwrap();
        let entry = library.scanned.get_all().unwrap().remove(0);

        let config = library.export_scanned_game(&entry.unique_id, None).unwrap();
        assert_eq!(config.sunshine_config.name, "Game A");
        assert_eq!(
            library.linked_scanned_game(&config.unique_id).unwrap(),
            Some(entry.clone())
        );

        library.remove_scanned_games(&[entry.id.as_str()]).unwrap();
        assert_eq!(library.linked_scanned_game(&config.unique_id).unwrap(), None);

        let kept = library.exports.get_by_id(&config.unique_id).unwrap();
        assert_eq!(kept.game_infos, entry.game_details);
    }

    #[test]
    fn test_export_unknown_scanned_game() {
        let library = configured_library();
        assert!(matches!(
            library.export_scanned_game("missing", None),
            Err(CoreError::NotFound(_))
        ));
    }
}
