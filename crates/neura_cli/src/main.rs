//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `neura_core` linkage.
//! - Open the configured store and report what it holds.

use neura_core::{NoteKind, NoteStore, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("neura_core ping={}", neura_core::ping());
    println!("neura_core version={}", neura_core::core_version());

    if let Err(err) = neura_core::logging::init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let store = match NoteStore::open(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    println!(
        "store path={} key={} scope={}",
        config.db_path.display(),
        store.storage_key(),
        store.search_scope()
    );
    println!(
        "notes total={} text={} checklist={} audio={}",
        store.len(),
        store.count_by_kind(NoteKind::Text),
        store.count_by_kind(NoteKind::Checklist),
        store.count_by_kind(NoteKind::Audio)
    );
    ExitCode::SUCCESS
}
