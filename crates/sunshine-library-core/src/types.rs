// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Type definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A game as reported by the library scanner.
///
/// `cmd` is the content key: it identifies the same physical game across
/// rescans. Everything else is metadata that only matters for change
/// detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Launch command, e.g. `steam://rungameid/440`
    pub cmd: String,
    /// Platform application id. `"0"` marks a non-Steam shortcut.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_flags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installdir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_on_disk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<String>,
    /// Any other metadata the scanner emits, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GameRecord {
    /// Create a record with only a launch command and a display name
    pub fn new(cmd: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            app_id: None,
            name: name.into(),
            image_path: None,
            exe: None,
            start_dir: None,
            shortcut_path: None,
            launch_options: None,
            hidden: None,
            tags: None,
            universe: None,
            state_flags: None,
            installdir: None,
            last_updated: None,
            size_on_disk: None,
            buildid: None,
            last_played: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Copy of this record with absent values stripped from the extra
    /// metadata.
    ///
    /// A key holding JSON `null` means the same thing as a missing key, at
    /// any nesting depth inside the extra map. Typed optional fields already
    /// collapse both cases into `None`.
    pub fn normalized(&self) -> Self {
        let mut record = self.clone();
        record.extra.retain(|_, value| !value.is_null());
        for value in record.extra.values_mut() {
            strip_nulls(value);
        }
        record
    }

    /// Deep equality after normalization
    pub fn same_content(&self, other: &GameRecord) -> bool {
        self.normalized() == other.normalized()
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Persisted wrapper around a scanned [`GameRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedGameEntry {
    /// Content key, equal to `game_details.cmd`
    pub id: String,
    /// Stable identifier, assigned once and kept across rescans
    pub unique_id: String,
    pub is_steam_game: bool,
    pub game_details: GameRecord,
}

/// Diff between a fresh scan and the persisted scanned games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub to_add: Vec<ScannedGameEntry>,
    pub to_update: Vec<ScannedGameEntry>,
    pub to_remove: Vec<ScannedGameEntry>,
}

impl SyncResult {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    pub fn summary(&self) -> SyncSummary {
        SyncSummary {
            added: self.to_add.len(),
            updated: self.to_update.len(),
            removed: self.to_remove.len(),
        }
    }
}

/// Counts of a [`SyncResult`], used for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} removed",
            self.added, self.updated, self.removed
        )
    }
}

/// A command pair run before launch and after exit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepCommand {
    #[serde(rename = "do")]
    pub do_cmd: String,
    pub undo: String,
    #[serde(default)]
    pub elevated: bool,
}

/// Launch definition as understood by the Sunshine host.
///
/// Keys follow the host's kebab-case naming. The host rejects apps that
/// lack `prep-cmd` or `detached`, so both lists are always serialized,
/// even when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SunshineAppConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_global_prep_cmd: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_detach: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_all: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_timeout: Option<u64>,
    #[serde(default)]
    pub prep_cmd: Vec<PrepCommand>,
    #[serde(default)]
    pub detached: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl SunshineAppConfig {
    /// Blank template with the host's defaults filled in
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: Some(String::new()),
            working_dir: Some(String::new()),
            exit_timeout: Some(0),
            image_path: Some(String::new()),
            ..Self::default()
        }
    }

    /// Template pre-filled from a scanned game
    pub fn from_scanned_game(entry: &ScannedGameEntry) -> Self {
        let game = &entry.game_details;
        Self {
            cmd: Some(game.cmd.clone()),
            image_path: game.image_path.clone(),
            ..Self::named(game.name.clone())
        }
    }
}

/// A user-curated launch definition meant to be pushed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    pub unique_id: String,
    /// Weak back-reference to the originating scanned game; may dangle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_game_unique_id: Option<String>,
    #[serde(default)]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    pub sunshine_config: SunshineAppConfig,
    /// Snapshot of the game at creation time, never refreshed by rescans
    pub game_infos: GameRecord,
}

/// Field-level replacement for [`ExportConfig`]. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportConfigPatch {
    /// `Some(None)` clears the back-reference
    pub scanned_game_unique_id: Option<Option<String>>,
    pub is_exported: Option<bool>,
    pub app_id: Option<Option<String>>,
    pub sunshine_config: Option<SunshineAppConfig>,
    pub game_infos: Option<GameRecord>,
}

impl ExportConfigPatch {
    pub fn exported(is_exported: bool) -> Self {
        Self {
            is_exported: Some(is_exported),
            ..Self::default()
        }
    }

    pub fn apply_to(self, config: &mut ExportConfig) {
        if let Some(scanned_game_unique_id) = self.scanned_game_unique_id {
            config.scanned_game_unique_id = scanned_game_unique_id;
        }
        if let Some(is_exported) = self.is_exported {
            config.is_exported = is_exported;
        }
        if let Some(app_id) = self.app_id {
            config.app_id = app_id;
        }
        if let Some(sunshine_config) = self.sunshine_config {
            config.sunshine_config = sunshine_config;
        }
        if let Some(game_infos) = self.game_infos {
            config.game_infos = game_infos;
        }
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// Application settings (GUI-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme_mode: ThemeMode,
    /// Steam installation directory, the scanner's library root
    pub steam_path: String,
    /// Steam user whose shortcuts are scanned
    pub steam_id: String,
    pub language: String,
    pub sunshine_path: String,
    pub first_launch: bool,
    pub sunshine_login: String,
    /// Encrypted with the configured credential cipher, never plain text
    pub sunshine_password: String,
    pub sunshine_url: String,
}

pub const DEFAULT_SUNSHINE_URL: &str = "https://localhost:47990";

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::System,
            steam_path: String::new(),
            steam_id: String::new(),
            language: "en".to_string(),
            sunshine_path: String::new(),
            first_launch: true,
            sunshine_login: String::new(),
            sunshine_password: String::new(),
            sunshine_url: DEFAULT_SUNSHINE_URL.to_string(),
        }
    }
}

/// Category of a [`CoreError`], as reported to frontends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    StoreIo,
}

/// Error types for the core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store I/O error: {0}")]
    StoreIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::StoreIo(_) | CoreError::Serialization(_) => ErrorKind::StoreIo,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::StoreIo(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Serializable form of a [`CoreResult`] for consumers on the other side
/// of a process boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Envelope<T> {
    Ok { data: T },
    Error { kind: ErrorKind, message: String },
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Ok { .. })
    }
}

impl<T> From<CoreResult<T>> for Envelope<T> {
    fn from(result: CoreResult<T>) -> Self {
        match result {
            Ok(data) => Envelope::Ok { data },
            Err(err) => Envelope::Error {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme_mode, ThemeMode::System);
        assert_eq!(settings.language, "en");
        assert_eq!(settings.sunshine_url, DEFAULT_SUNSHINE_URL);
        assert!(settings.first_launch);
    }

    #[test]
    fn test_partial_settings_take_defaults() {
        let settings: AppSettings =
            serde_json::from_value(json!({ "steamPath": "/home/me/.steam", "themeMode": "dark" }))
                .unwrap();
        assert_eq!(settings.steam_path, "/home/me/.steam");
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.sunshine_url, DEFAULT_SUNSHINE_URL);
    }

    #[test]
    fn test_game_record_keeps_unknown_metadata() {
        let record: GameRecord = serde_json::from_value(json!({
            "cmd": "steam://rungameid/10",
            "appId": "10",
            "name": "Counter-Strike",
            "sizeOnDisk": "1024",
            "ownerBadge": "gold"
        }))
        .unwrap();
        assert_eq!(record.size_on_disk.as_deref(), Some("1024"));
        assert_eq!(record.extra.get("ownerBadge"), Some(&json!("gold")));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["ownerBadge"], json!("gold"));
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn test_null_and_missing_fields_are_same_content() {
        let explicit: GameRecord = serde_json::from_value(json!({
            "cmd": "a", "name": "A", "tags": null, "rating": null,
            "meta": { "source": "steam", "banner": null }
        }))
        .unwrap();
        let omitted: GameRecord = serde_json::from_value(json!({
            "cmd": "a", "name": "A", "meta": { "source": "steam" }
        }))
        .unwrap();
        assert!(explicit.same_content(&omitted));
    }

    #[test]
    fn test_changed_metadata_is_different_content() {
        let before = GameRecord::new("a", "A");
        let mut after = before.clone();
        after.tags = Some(vec!["RPG".to_string()]);
        assert!(!before.same_content(&after));
    }

    #[test]
    fn test_sunshine_config_always_serializes_mandatory_lists() {
        let value = serde_json::to_value(SunshineAppConfig::named("Desktop")).unwrap();
        assert_eq!(value["prep-cmd"], json!([]));
        assert_eq!(value["detached"], json!([]));
        assert_eq!(value["exit-timeout"], json!(0));

        let parsed: SunshineAppConfig = serde_json::from_value(json!({ "name": "Bare" })).unwrap();
        assert!(parsed.prep_cmd.is_empty());
        assert!(parsed.detached.is_empty());
    }

    #[test]
    fn test_prep_command_uses_do_key() {
        let value = serde_json::to_value(PrepCommand {
            do_cmd: "xrandr --output HDMI-1 --mode 1920x1080".to_string(),
            undo: "xrandr --output HDMI-1 --auto".to_string(),
            elevated: false,
        })
        .unwrap();
        assert!(value.get("do").is_some());
    }

    #[test]
    fn test_template_from_scanned_game() {
        let mut game = GameRecord::new("steam://rungameid/620", "Portal 2").with_app_id("620");
        game.image_path = Some("/covers/620.png".to_string());
        let entry = ScannedGameEntry {
            id: game.cmd.clone(),
            unique_id: "u-1".to_string(),
            is_steam_game: true,
            game_details: game,
        };

        let template = SunshineAppConfig::from_scanned_game(&entry);
        assert_eq!(template.name, "Portal 2");
        assert_eq!(template.cmd.as_deref(), Some("steam://rungameid/620"));
        assert_eq!(template.image_path.as_deref(), Some("/covers/620.png"));
        assert_eq!(template.exit_timeout, Some(0));
    }

    #[test]
    fn test_envelope_from_result() {
        let ok = Envelope::from(CoreResult::Ok(3u32));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "status": "ok", "data": 3 }));

        let err: Envelope<u32> =
            Envelope::from(Err(CoreError::NotFound("Game not found".to_string())));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], json!("error"));
        assert_eq!(value["kind"], json!("notFound"));
        assert!(!err.is_ok());
    }

    #[test]
    fn test_serialization_errors_report_store_kind() {
        let err = CoreError::Serialization("bad json".to_string());
        assert_eq!(err.kind(), ErrorKind::StoreIo);
    }

    #[test]
    fn test_sync_summary_display() {
        let summary = SyncSummary {
            added: 2,
            updated: 1,
            removed: 0,
        };
        assert_eq!(summary.to_string(), "2 added, 1 updated, 0 removed");
    }
}
