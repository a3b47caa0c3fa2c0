//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notekeep_core` linkage and store bootstrap from a shell.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `notekeep_cli [config.toml]`

use log::error;
use notekeep_core::{init_logging_from_config, load_config, CoreConfig, NoteStore};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notekeep_core version={}", notekeep_core::core_version());

    let Some(config_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match run(Path::new(&config_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_probe module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &Path) -> Result<(), String> {
    let config: CoreConfig = load_config(config_path).map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    let store = NoteStore::open_configured(&config).map_err(|err| err.to_string())?;
    let dangling = store
        .raw_notes()
        .iter()
        .map(|note| note.tag_ids.len())
        .sum::<usize>()
        - store
            .resolved_notes()
            .iter()
            .map(|note| note.tags.len())
            .sum::<usize>();

    println!(
        "store={}",
        config
            .db_path
            .as_deref()
            .map_or_else(|| "memory".to_string(), |path| path.display().to_string())
    );
    println!("notes={}", store.raw_notes().len());
    println!("tags={}", store.tags().len());
    println!("dangling_tag_refs={dangling}");
    println!("tag_delete_policy={}", store.tag_delete_policy().as_str());
    Ok(())
}
