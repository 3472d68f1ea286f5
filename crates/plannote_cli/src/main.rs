//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `plannote_core` linkage, configuration and store bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use log::info;
use plannote_core::db::migrations::current_user_version;
use plannote_core::db::open_db;
use plannote_core::{init_logging, CoreConfig, SqliteNoteRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("plannote_core ping={}", plannote_core::ping());
    println!("plannote_core version={}", plannote_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("plannote_cli error={message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env()?;
    let log_dir = config
        .log_dir
        .to_str()
        .ok_or_else(|| format!("log dir `{}` is not UTF-8", config.log_dir.display()))?;
    init_logging(config.log_level, log_dir)?;

    let mut conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let schema_version = current_user_version(&conn).map_err(|err| err.to_string())?;
    let repo = SqliteNoteRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
    let note_count = repo.count_notes().map_err(|err| err.to_string())?;

    info!("event=cli_probe module=cli status=ok schema_version={schema_version} notes={note_count}");
    println!("plannote_core db={}", config.db_path.display());
    println!("plannote_core schema_version={schema_version}");
    println!("plannote_core notes={note_count}");
    Ok(())
}
