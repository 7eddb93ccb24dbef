// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Scanned game reconciliation
//
// A rescan is diffed against the persisted entries by content key, then the
// diff is folded back into a full replacement collection. Both steps are
// pure; persistence is the repository's job.

use crate::identity::{compose_id, generate_unique_id, is_native_entry};
use crate::types::{CoreError, CoreResult, GameRecord, ScannedGameEntry, SyncResult};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Compute the add/update/remove diff between a fresh scan and the stored
/// entries.
///
/// An empty scan is rejected: a scan that finds nothing is far more likely
/// a broken library path than a user with zero games.
///
/// Stored `unique_id`s are carried over for every game whose launch command
/// is still present. If the scan lists the same command twice, the last
/// record wins.
pub fn sync_scanned_games(
    new_scan: &[GameRecord],
    stored: &[ScannedGameEntry],
) -> CoreResult<SyncResult> {
    if new_scan.is_empty() {
        return Err(CoreError::InvalidInput(
            "No new games provided for sync".to_string(),
        ));
    }
    if let Some(position) = new_scan.iter().position(|game| game.cmd.trim().is_empty()) {
        return Err(CoreError::InvalidInput(format!(
            "Scanned game at position {} has an empty launch command",
            position
        )));
    }

    let stored_by_id: HashMap<&str, &ScannedGameEntry> = stored
        .iter()
        .map(|entry| (entry.id.as_str(), entry))
        .collect();

    let mut new_entries: IndexMap<String, ScannedGameEntry> =
        IndexMap::with_capacity(new_scan.len());
    for game in new_scan {
        let id = compose_id(game);
        let unique_id = stored_by_id
            .get(id.as_str())
            .map(|entry| entry.unique_id.clone())
            .or_else(|| new_entries.get(&id).map(|entry| entry.unique_id.clone()))
            .unwrap_or_else(generate_unique_id);

        let entry = ScannedGameEntry {
            id: id.clone(),
            unique_id,
            is_steam_game: is_native_entry(game),
            game_details: game.clone(),
        };
        if new_entries.insert(id, entry).is_some() {
            tracing::warn!("Launch command listed twice in scan, keeping last: {}", game.cmd);
        }
    }

    let mut result = SyncResult::default();
    for entry in new_entries.values() {
        match stored_by_id.get(entry.id.as_str()) {
            None => result.to_add.push(entry.clone()),
            Some(existing) if !existing.game_details.same_content(&entry.game_details) => {
                result.to_update.push(entry.clone())
            }
            Some(_) => {}
        }
    }
    result.to_remove = stored
        .iter()
        .filter(|entry| !new_entries.contains_key(&entry.id))
        .cloned()
        .collect();

    tracing::debug!(
        "Reconciled {} scanned games against {} stored: {}",
        new_scan.len(),
        stored.len(),
        result.summary()
    );
    Ok(result)
}

/// Fold a [`SyncResult`] into `stored`, returning the full collection to
/// persist.
///
/// Removals go first, then additions, then updates. Updates replace the
/// stored entry in place so collection order stays stable. An addition
/// whose `unique_id` or `id` is already present is skipped, which makes
/// applying the same result twice harmless.
pub fn apply_sync_result(
    stored: Vec<ScannedGameEntry>,
    result: &SyncResult,
) -> Vec<ScannedGameEntry> {
    let removed: HashSet<&str> = result.to_remove.iter().map(|e| e.id.as_str()).collect();
    let mut games: Vec<ScannedGameEntry> = stored
        .into_iter()
        .filter(|entry| !removed.contains(entry.id.as_str()))
        .collect();

    let mut ids: HashSet<String> = games.iter().map(|e| e.id.clone()).collect();
    let mut unique_ids: HashSet<String> = games.iter().map(|e| e.unique_id.clone()).collect();

    for entry in &result.to_add {
        if unique_ids.contains(&entry.unique_id) || ids.contains(&entry.id) {
            tracing::warn!("Skipping addition already present in store: {}", entry.id);
            continue;
        }
        ids.insert(entry.id.clone());
        unique_ids.insert(entry.unique_id.clone());
        games.push(entry.clone());
    }

    for entry in &result.to_update {
        match games.iter_mut().find(|game| game.id == entry.id) {
            Some(slot) => *slot = entry.clone(),
            None => games.push(entry.clone()),
        }
    }

    games
}
