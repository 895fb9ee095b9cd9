//! On-disk session persistence for command-line use.
//!
//! The CLI is a fresh process per invocation, so a signed-in session is
//! written to `session.json` in the data directory after login and removed
//! after logout.

use std::path::{Path, PathBuf};

use sc_core::error::ScResult;
use sc_core::platform::Platform;
use sc_models::Session;
use tracing::{debug, warn};

const SESSION_FILE_NAME: &str = "session.json";

/// A session file at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` in the platform data directory.
    pub fn default_path() -> ScResult<PathBuf> {
        Ok(Platform::data_dir()?.join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, or `None` if there is none.
    ///
    /// An unreadable file is treated as absent and removed.
    pub fn load(&self) -> ScResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => {
                debug!("loaded session from {}", self.path.display());
                Ok(Some(session))
            }
            Err(e) => {
                warn!("discarding unreadable session file {}: {e}", self.path.display());
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> ScResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        restrict_permissions(&self.path)?;
        debug!("saved session to {}", self.path.display());
        Ok(())
    }

    /// Remove the file. Missing files are fine.
    pub fn clear(&self) -> ScResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> ScResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> ScResult<()> {
    Ok(())
}
