// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library CLI - Commands
//
// Usage:
//   sunshine-library [--config <file>] [--json] <command>
//
// Commands:
//   games                      List scanned games
//   sync <scan.json>           Reconcile a scan result and store it
//   dry-run <scan.json>        Show what a scan result would change
//   remove <id>...             Remove scanned games by launch command
//   exports                    List export configs
//   export <scanned-id>        Create an export config from a scanned game
//   unexport <export-id>       Delete an export config
//   settings                   Show settings

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use sunshine_library_core::{CoreError, CoreResult, Envelope, GameRecord, Library, SyncResult};

pub const USAGE: &str = "usage: sunshine-library [--config <file>] [--json] \
<games | sync <scan.json> | dry-run <scan.json> | remove <id>... | exports | \
export <scanned-id> | unexport <export-id> | settings>";

/// CLI command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Games,
    Sync { scan_file: PathBuf },
    DryRun { scan_file: PathBuf },
    Remove { ids: Vec<String> },
    Exports,
    Export { scanned_unique_id: String },
    Unexport { export_unique_id: String },
    Settings,
}

/// CLI options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub json: bool,
    pub config: Option<PathBuf>,
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut command: Option<CliCommand> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file")?;
                options.config = Some(PathBuf::from(path));
            }
            "games" => command = Some(CliCommand::Games),
            "exports" => command = Some(CliCommand::Exports),
            "settings" => command = Some(CliCommand::Settings),
            "sync" | "dry-run" => {
                i += 1;
                let scan_file = PathBuf::from(
                    args.get(i)
                        .ok_or_else(|| format!("{} requires a scan file", arg))?,
                );
                command = Some(if arg == "sync" {
                    CliCommand::Sync { scan_file }
                } else {
                    CliCommand::DryRun { scan_file }
                });
            }
            "remove" => {
                let ids: Vec<String> = args[i + 1..]
                    .iter()
                    .take_while(|a| !a.starts_with("--"))
                    .cloned()
                    .collect();
                if ids.is_empty() {
                    return Err("remove requires at least one id".to_string());
                }
                i += ids.len();
                command = Some(CliCommand::Remove { ids });
            }
            "export" => {
                i += 1;
                let id = args.get(i).ok_or("export requires a scanned game id")?;
                command = Some(CliCommand::Export {
                    scanned_unique_id: id.clone(),
                });
            }
            "unexport" => {
                i += 1;
                let id = args.get(i).ok_or("unexport requires an export id")?;
                command = Some(CliCommand::Unexport {
                    export_unique_id: id.clone(),
                });
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    let command = command.ok_or_else(|| USAGE.to_string())?;
    Ok((command, options))
}

/// Run a command against the library. Returns whether it succeeded.
pub fn run(library: &Library, command: CliCommand, options: &CliOptions) -> bool {
    match command {
        CliCommand::Games => emit(options, library.scanned.get_all(), |games| {
            for game in games {
                let kind = if game.is_steam_game { "steam" } else { "shortcut" };
                println!(
                    "{}  {:<8}  {}  ({})",
                    game.unique_id, kind, game.game_details.name, game.id
                );
            }
            println!("{} scanned games", games.len());
        }),
        CliCommand::Sync { scan_file } => emit(
            options,
            read_scan(&scan_file).and_then(|scan| library.scanned.rescan(&scan)),
            print_sync,
        ),
        CliCommand::DryRun { scan_file } => emit(
            options,
            read_scan(&scan_file).and_then(|scan| library.scanned.sync(&scan)),
            print_sync,
        ),
        CliCommand::Remove { ids } => emit(
            options,
            library.remove_scanned_games(ids.as_slice()),
            |_| println!("Removed games matching {} ids", ids.len()),
        ),
        CliCommand::Exports => emit(options, library.exports.get_all(), |configs| {
            for config in configs {
                let state = if config.is_exported { "exported" } else { "pending" };
                println!(
                    "{}  {:<8}  {}",
                    config.unique_id, state, config.sunshine_config.name
                );
            }
            println!("{} export configs", configs.len());
        }),
        CliCommand::Export { scanned_unique_id } => emit(
            options,
            library.export_scanned_game(&scanned_unique_id, None),
            |config| {
                println!(
                    "Created export config {} for {}",
                    config.unique_id, config.sunshine_config.name
                );
            },
        ),
        CliCommand::Unexport { export_unique_id } => emit(
            options,
            library.exports.remove_by_id(&export_unique_id),
            |_| println!("Removed export config {}", export_unique_id),
        ),
        CliCommand::Settings => emit(options, library.settings.get(), |settings| {
            println!("Steam path:    {}", settings.steam_path);
            println!("Steam user:    {}", settings.steam_id);
            println!("Sunshine URL:  {}", settings.sunshine_url);
            println!("Sunshine user: {}", settings.sunshine_login);
            println!("Language:      {}", settings.language);
        }),
    }
}

/// Read a scanner result: a JSON array of game records
fn read_scan(path: &Path) -> CoreResult<Vec<GameRecord>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CoreError::InvalidInput(format!("Failed to read scan file {:?}: {}", path, e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        CoreError::InvalidInput(format!("Failed to parse scan file {:?}: {}", path, e))
    })
}

fn print_sync(result: &SyncResult) {
    for entry in &result.to_add {
        println!("+ {}", entry.game_details.name);
    }
    for entry in &result.to_update {
        println!("~ {}", entry.game_details.name);
    }
    for entry in &result.to_remove {
        println!("- {}", entry.game_details.name);
    }
    println!("{}", result.summary());
}

/// Print a result either as an envelope or through `human`
fn emit<T: Serialize>(
    options: &CliOptions,
    result: CoreResult<T>,
    human: impl FnOnce(&T),
) -> bool {
    if options.json {
        let envelope = Envelope::from(result);
        let ok = envelope.is_ok();
        match serde_json::to_string_pretty(&envelope) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize result: {}", e),
        }
        return ok;
    }

    match result {
        Ok(data) => {
            human(&data);
            true
        }
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("Error: {}", err);
            false
        }
    }
}
