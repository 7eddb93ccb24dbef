// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Export configurations
//
// Export configs are user-authored launch definitions derived from scanned
// games. They keep their own snapshot of the game, so removing or rescanning
// the scanned entry never touches them.

use crate::identity::generate_unique_id;
use crate::store::{keys, Store, StoreExt};
use crate::types::{
    CoreError, CoreResult, ExportConfig, ExportConfigPatch, GameRecord, SunshineAppConfig,
};
use std::sync::Arc;

/// CRUD over the persisted export configurations
pub struct ExportConfigRepository {
    store: Arc<dyn Store>,
}

impl ExportConfigRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> CoreResult<Vec<ExportConfig>> {
        self.store.load_or_default(keys::GAMES_TO_EXPORT)
    }

    pub fn get_by_id(&self, unique_id: &str) -> CoreResult<ExportConfig> {
        self.get_all()?
            .into_iter()
            .find(|config| config.unique_id == unique_id)
            .ok_or_else(|| {
                CoreError::NotFound(format!("Export config not found: {}", unique_id))
            })
    }

    /// Replace the whole collection verbatim
    pub fn set_all(&self, configs: &[ExportConfig]) -> CoreResult<()> {
        self.store.save(keys::GAMES_TO_EXPORT, configs)?;
        tracing::info!("Stored {} export configs", configs.len());
        Ok(())
    }

    /// Append a fully formed config
    pub fn add(&self, config: ExportConfig) -> CoreResult<()> {
        let mut configs = self.get_all()?;
        if configs.iter().any(|c| c.unique_id == config.unique_id) {
            return Err(CoreError::InvalidInput(format!(
                "Export config already exists: {}",
                config.unique_id
            )));
        }
        configs.push(config);
        self.set_all(&configs)
    }

    /// Derive a new config from a launch template and a game snapshot.
    ///
    /// The template's `prep-cmd` and `detached` lists are always present
    /// (possibly empty), as the host requires.
    pub fn create(
        &self,
        template: SunshineAppConfig,
        game: &GameRecord,
        scanned_game_unique_id: Option<&str>,
    ) -> CoreResult<ExportConfig> {
        let config = ExportConfig {
            unique_id: generate_unique_id(),
            scanned_game_unique_id: scanned_game_unique_id.map(str::to_string),
            is_exported: false,
            app_id: game.app_id.clone(),
            sunshine_config: template,
            game_infos: game.clone(),
        };

        let mut configs = self.get_all()?;
        configs.push(config.clone());
        self.set_all(&configs)?;

        tracing::info!("Created export config {} for {}", config.unique_id, game.cmd);
        Ok(config)
    }

    /// Shallow-merge `patch` onto the config with `unique_id`
    pub fn update(&self, unique_id: &str, patch: ExportConfigPatch) -> CoreResult<ExportConfig> {
        let mut configs = self.get_all()?;
        let config = configs
            .iter_mut()
            .find(|config| config.unique_id == unique_id)
            .ok_or_else(|| {
                CoreError::NotFound(format!("Export config not found: {}", unique_id))
            })?;

        patch.apply_to(config);
        let updated = config.clone();

        self.set_all(&configs)?;
        Ok(updated)
    }

    pub fn remove_by_id(&self, unique_id: &str) -> CoreResult<()> {
        let mut configs = self.get_all()?;
        configs.retain(|config| config.unique_id != unique_id);
        self.set_all(&configs)
    }

    /// Remove every config pointing at the given platform app id
    pub fn remove_by_app_id(&self, app_id: &str) -> CoreResult<()> {
        let mut configs = self.get_all()?;
        configs.retain(|config| config.app_id.as_deref() != Some(app_id));
        self.set_all(&configs)
    }

    pub fn remove_all(&self) -> CoreResult<()> {
        self.set_all(&[])
    }

    /// Configs derived from the given scanned game
    pub fn find_by_scanned_game(
        &self,
        scanned_game_unique_id: &str,
    ) -> CoreResult<Vec<ExportConfig>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|config| {
                config.scanned_game_unique_id.as_deref() == Some(scanned_game_unique_id)
            })
            .collect())
    }
}
