// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library CLI - Main entry point
//
// Headless frontend for scripting: reconcile scan results, curate export
// configs and inspect settings.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use sunshine_library_core::{JsonFileStore, Library};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sunshine_library_cli=info".parse().unwrap())
                .add_directive("sunshine_library_core=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, options) = match cli::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    let store = match &options.config {
        Some(path) => JsonFileStore::open(path),
        None => JsonFileStore::open_default(),
    };
    let library = match store {
        Ok(store) => Library::new(Arc::new(store)),
        Err(err) => {
            eprintln!("Failed to open library: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if cli::run(&library, command, &options) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
