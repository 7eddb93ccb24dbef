// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Settings persistence
//
// Settings share the persisted document with the game collections.
// The Sunshine password is only ever stored encrypted.

use crate::store::{keys, Store, StoreExt};
use crate::types::{AppSettings, CoreError, CoreResult};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Symmetric encryption for the stored Sunshine credential
pub trait CredentialCipher: Send + Sync {
    fn encrypt(&self, text: &str) -> CoreResult<String>;
    fn decrypt(&self, data: &str) -> CoreResult<String>;
}

/// What the library scanner needs to enumerate games
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub library_root: PathBuf,
    pub user_id: String,
}

/// Settings access over the shared store
pub struct SettingsStore {
    store: Arc<dyn Store>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get current settings. A stored field that does not parse falls back
    /// to its default without discarding the others.
    pub fn get(&self) -> CoreResult<AppSettings> {
        let settings = match self.store.get(keys::SETTINGS)? {
            Some(value) => parse_settings(value),
            None => AppSettings::default(),
        };
        Ok(settings)
    }

    /// Replace settings and persist
    pub fn update(&self, new_settings: &AppSettings) -> CoreResult<()> {
        tracing::info!("Updating settings, theme: {:?}", new_settings.theme_mode);
        let result = self.store.save(keys::SETTINGS, new_settings);
        if let Err(ref err) = result {
            tracing::error!("Failed to persist settings: {}", err);
        }
        result
    }

    /// Encrypt and store the Sunshine password
    pub fn set_sunshine_password(
        &self,
        cipher: &dyn CredentialCipher,
        password: &str,
    ) -> CoreResult<()> {
        let mut settings = self.get()?;
        settings.sunshine_password = cipher.encrypt(password)?;
        self.update(&settings)
    }

    /// Decrypt the stored Sunshine password, `None` if none was saved
    pub fn sunshine_password(&self, cipher: &dyn CredentialCipher) -> CoreResult<Option<String>> {
        let settings = self.get()?;
        if settings.sunshine_password.is_empty() {
            return Ok(None);
        }
        cipher.decrypt(&settings.sunshine_password).map(Some)
    }

    /// Steam path and user the scanner should use.
    ///
    /// Scanning without both would enumerate nothing, which the
    /// reconciliation treats as a failure anyway.
    pub fn scan_target(&self) -> CoreResult<ScanTarget> {
        let settings = self.get()?;
        if settings.steam_path.trim().is_empty() || settings.steam_id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "Steam path or Steam user is not set".to_string(),
            ));
        }
        Ok(ScanTarget {
            library_root: PathBuf::from(settings.steam_path),
            user_id: settings.steam_id,
        })
    }
}

/// Parse stored settings, keeping every field that parses on its own
fn parse_settings(value: Value) -> AppSettings {
    let err = match serde_json::from_value::<AppSettings>(value.clone()) {
        Ok(settings) => return settings,
        Err(err) => err,
    };
    let Value::Object(stored) = value else {
        tracing::warn!("Failed to parse settings, using defaults: {}", err);
        return AppSettings::default();
    };

    let mut kept = Map::new();
    let mut settings = AppSettings::default();
    for (key, field) in stored {
        let mut candidate = kept.clone();
        candidate.insert(key.clone(), field);
        match serde_json::from_value(Value::Object(candidate.clone())) {
            Ok(parsed) => {
                kept = candidate;
                settings = parsed;
            }
            Err(e) => tracing::warn!("Ignoring unparsable setting {}: {}", key, e),
        }
    }
    settings
}
