// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Game identity
//
// A scanned game is known by its launch command. Two distinct games that
// share a launch command collapse into one entry; the scanner is trusted
// not to produce that.

use crate::types::GameRecord;

/// App id the scanner reports for non-Steam shortcuts
pub const NON_STEAM_APP_ID: &str = "0";

/// Content key of a game: its launch command, unchanged
pub fn compose_id(game: &GameRecord) -> String {
    game.cmd.clone()
}

/// Whether the game belongs to the Steam catalog rather than being a
/// user-added shortcut
pub fn is_native_entry(game: &GameRecord) -> bool {
    match game.app_id.as_deref() {
        Some(app_id) => !app_id.is_empty() && app_id != NON_STEAM_APP_ID,
        None => false,
    }
}

/// Fresh opaque identifier (UUID v4)
pub fn generate_unique_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
