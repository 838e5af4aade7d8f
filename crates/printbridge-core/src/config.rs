// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Runtime settings and their JSON-backed provider.
//
// Settings are read by every print request and by the spool monitor, and
// replaced only through `SettingsProvider::save_settings`. Reads hand out a
// cloned snapshot so no caller can observe a half-applied write.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PrintBridgeError, Result};

/// Fallback stale-spool timeout when the configured one is not positive.
pub const DEFAULT_AUTO_CLEAN_TIMEOUT_MINUTES: i64 = 20;

/// Operator-tunable settings, persisted as a flat JSON record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeSettings {
    /// Target printer. Empty means the system default printer.
    #[serde(alias = "PrinterName")]
    pub printer_name: String,
    /// Whether the spool monitor may clear a stuck queue on its own.
    #[serde(alias = "AutoCleanEnabled")]
    pub auto_clean_enabled: bool,
    /// Age in minutes after which a spool file counts as stuck.
    #[serde(alias = "AutoCleanTimeoutMinutes")]
    pub auto_clean_timeout_minutes: i64,
    /// Whether document previews are served.
    #[serde(alias = "PreviewEnabled")]
    pub preview_enabled: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            printer_name: String::new(),
            auto_clean_enabled: false,
            auto_clean_timeout_minutes: DEFAULT_AUTO_CLEAN_TIMEOUT_MINUTES,
            preview_enabled: true,
        }
    }
}

impl RuntimeSettings {
    /// The stale-spool timeout, with non-positive values replaced by the default.
    pub fn effective_timeout_minutes(&self) -> i64 {
        if self.auto_clean_timeout_minutes <= 0 {
            DEFAULT_AUTO_CLEAN_TIMEOUT_MINUTES
        } else {
            self.auto_clean_timeout_minutes
        }
    }

    /// The printer to target, or `None` for the system default.
    pub fn printer(&self) -> Option<&str> {
        let name = self.printer_name.trim();
        if name.is_empty() { None } else { Some(name) }
    }

    fn validate(&self) -> Result<()> {
        if self.auto_clean_timeout_minutes <= 0 {
            return Err(PrintBridgeError::InvalidSettings(format!(
                "autoCleanTimeoutMinutes must be positive, got {}",
                self.auto_clean_timeout_minutes
            )));
        }
        Ok(())
    }
}

/// Source of the current runtime settings.
pub trait SettingsProvider: Send + Sync {
    /// Snapshot of the current settings.
    fn get_settings(&self) -> RuntimeSettings;

    /// Replace and persist the settings.
    fn save_settings(&self, settings: RuntimeSettings) -> Result<()>;
}

/// Settings held in memory and mirrored to a JSON file.
pub struct SettingsStore {
    /// Backing file; `None` keeps settings in memory only.
    path: Option<PathBuf>,
    current: Mutex<RuntimeSettings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to `defaults` when the file is
    /// missing or unreadable.
    pub fn load(path: impl AsRef<Path>, defaults: RuntimeSettings) -> Self {
        let path = path.as_ref().to_path_buf();
        let settings = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<RuntimeSettings>(&json) {
                Ok(settings) => {
                    info!(path = %path.display(), "runtime settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "runtime settings unreadable, using defaults");
                    defaults
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no runtime settings file, using defaults");
                defaults
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "runtime settings unreadable, using defaults");
                defaults
            }
        };

        Self {
            path: Some(path),
            current: Mutex::new(settings),
        }
    }

    /// Settings that are never written to disk (tests, ephemeral runs).
    pub fn in_memory(settings: RuntimeSettings) -> Self {
        Self {
            path: None,
            current: Mutex::new(settings),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RuntimeSettings> {
        // A panic while holding the lock cannot leave a torn value behind:
        // the write below only swaps in a fully built record.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsProvider for SettingsStore {
    fn get_settings(&self) -> RuntimeSettings {
        self.lock().clone()
    }

    fn save_settings(&self, settings: RuntimeSettings) -> Result<()> {
        settings.validate()?;

        let mut current = self.lock();
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&settings)?;
            std::fs::write(path, json)?;
        }
        *current = settings;

        info!(
            printer = %current.printer_name,
            auto_clean = current.auto_clean_enabled,
            timeout_minutes = current.auto_clean_timeout_minutes,
            "runtime settings saved"
        );
        Ok(())
    }
}
