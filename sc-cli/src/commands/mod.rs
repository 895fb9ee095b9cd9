//! CLI command implementations.

pub mod offerings;
pub mod media;
pub mod contact;
pub mod auth;
pub mod config;

use chrono::{DateTime, Local, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tracing::{debug, warn};

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use sc_services::{DataService, SessionFile};

/// Build a service from config, restoring the saved session if enabled.
///
/// A saved session that has already expired is refreshed, or dropped if
/// the backend rejects it, and the file is rewritten before the command
/// runs.
pub async fn open_service(config: &ConfigHandle) -> ScResult<DataService> {
    let cfg = config.read().await.clone();
    let service = DataService::from_config(&cfg)?;
    if cfg.auth.persist_session {
        if let Some(session) = session_file()?.load()? {
            debug!("restored saved session for {}", session.user.id);
            let expired = session.is_expired_at(Utc::now());
            service.restore_session(session);
            if expired {
                if let Err(e) = service.refresh_session().await {
                    warn!("saved session could not be refreshed: {e}");
                }
                save_session(config, &service).await?;
            }
        }
    }
    Ok(service)
}

/// Write the service's session back to disk, or remove the file once the
/// session is gone.
pub async fn save_session(config: &ConfigHandle, service: &DataService) -> ScResult<()> {
    if !config.read().await.auth.persist_session {
        return Ok(());
    }
    let file = session_file()?;
    match service.session() {
        Some(session) => file.save(&session),
        None => file.clear(),
    }
}

fn session_file() -> ScResult<SessionFile> {
    Ok(SessionFile::new(SessionFile::default_path()?))
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> ScResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A table in the CLI's standard style.
pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Local-time rendering of a stored timestamp.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_chars).collect()
    }
}

/// Map a dialoguer prompt failure into the CLI's error type.
pub fn prompt_error(e: dialoguer::Error) -> ScError {
    ScError::Internal(format!("prompt failed: {e}"))
}
