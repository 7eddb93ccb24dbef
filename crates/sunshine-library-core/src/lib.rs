// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Shared logic for all frontends
//
// This crate provides:
// - Game, export config and settings types, plus CoreError
// - Reconciliation of library scans against stored games
// - Repositories for scanned games and export configs
// - SettingsStore and the JSON-backed persisted store
//
// Frontend-specific code lives in separate crates.

pub mod exports;
pub mod identity;
pub mod library;
pub mod reconcile;
pub mod scanned;
pub mod settings;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use exports::ExportConfigRepository;
pub use identity::{compose_id, generate_unique_id, is_native_entry};
pub use library::{Library, LibraryScanner};
pub use reconcile::{apply_sync_result, sync_scanned_games};
pub use scanned::ScannedGamesRepository;
pub use settings::{CredentialCipher, ScanTarget, SettingsStore};
pub use store::{JsonFileStore, MemoryStore, Store, StoreExt};
pub use types::{
    AppSettings, CoreError, CoreResult, Envelope, ErrorKind, ExportConfig, ExportConfigPatch,
    GameRecord, PrepCommand, ScannedGameEntry, SunshineAppConfig, SyncResult, SyncSummary,
    ThemeMode,
};
