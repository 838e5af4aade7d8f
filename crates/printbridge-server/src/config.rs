// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration, read once at startup from `config.json` in the data
// directory. Runtime-editable settings live separately in
// `runtime_settings.json` (see `printbridge_core::config`).

use std::path::{Path, PathBuf};

use printbridge_core::config::RuntimeSettings;
use printbridge_core::types::PaperSize;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const RUNTIME_SETTINGS_FILE: &str = "runtime_settings.json";

/// Startup configuration for the print bridge service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP API listens on.
    pub bind_addr: String,
    /// OS print spool directory watched by the spool monitor.
    pub spool_dir: PathBuf,
    /// Seconds between spool checks.
    pub poll_interval_secs: u64,
    /// Shared secret for admin endpoints; admin requests are refused when unset.
    pub admin_token: Option<String>,
    /// Printer used until an operator saves runtime settings.
    pub default_printer: String,
    pub paper_size: PaperSize,
    /// Margin on every side of the sheet for raster jobs.
    pub margin_mm: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".into(),
            spool_dir: default_spool_dir(),
            poll_interval_secs: 60,
            admin_token: None,
            default_printer: String::new(),
            paper_size: PaperSize::A4,
            margin_mm: 25.4,
        }
    }
}

impl ServiceConfig {
    /// Read `config.json` from `data_dir`, using defaults when it is missing
    /// or cannot be parsed.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    info!(path = %path.display(), "service configuration loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "service configuration invalid, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "no service configuration file, using defaults");
                Self::default()
            }
        }
    }

    /// Runtime settings to start from when none have been saved yet.
    pub fn runtime_defaults(&self) -> RuntimeSettings {
        RuntimeSettings {
            printer_name: self.default_printer.clone(),
            ..RuntimeSettings::default()
        }
    }

    /// Admin token, ignoring a blank value.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

fn default_spool_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\spool\PRINTERS")
    } else {
        PathBuf::from("/var/spool/cups")
    }
}
