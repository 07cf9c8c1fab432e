//! Persisted UI theme preference. The storage itself is an opaque
//! collaborator behind `PreferenceStore`; the shipped implementation keeps
//! a small JSON file.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::domain::ThemeMode;
use tracing::warn;

pub trait PreferenceStore: Send + Sync {
    fn load_theme(&self) -> Result<Option<ThemeMode>>;
    fn save_theme(&self, mode: ThemeMode) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreferences {
    mode: ThemeMode,
}

pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_theme(&self) -> Result<Option<ThemeMode>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read '{}'", self.path.display()))?;
        let stored: StoredPreferences = serde_json::from_str(&raw)
            .with_context(|| format!("malformed preference file '{}'", self.path.display()))?;
        Ok(Some(stored.mode))
    }

    fn save_theme(&self, mode: ThemeMode) -> Result<()> {
        ensure_parent_dir_exists(&self.path)?;
        let raw = serde_json::to_string_pretty(&StoredPreferences { mode })
            .context("failed to encode theme preference")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write '{}'", self.path.display()))?;
        Ok(())
    }
}

fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create preference directory '{}'", parent.display()))
}

/// Reads the stored mode once at startup and writes back on every change.
pub struct ThemeController {
    mode: ThemeMode,
    prefs: Arc<dyn PreferenceStore>,
}

impl ThemeController {
    /// An unreadable preference file falls back to light rather than
    /// failing startup.
    pub fn load_or_default(prefs: Arc<dyn PreferenceStore>) -> Self {
        let mode = match prefs.load_theme() {
            Ok(Some(mode)) => mode,
            Ok(None) => ThemeMode::Light,
            Err(err) => {
                warn!("falling back to light theme: {err:#}");
                ThemeMode::Light
            }
        };
        Self { mode, prefs }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn toggle(&mut self) -> Result<ThemeMode> {
        self.set(self.mode.toggled())?;
        Ok(self.mode)
    }

    pub fn set(&mut self, mode: ThemeMode) -> Result<()> {
        self.prefs.save_theme(mode)?;
        self.mode = mode;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/theme_tests.rs"]
mod tests;
