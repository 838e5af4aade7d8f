// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "printbridge";

/// Return the service data directory, creating it if needed.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = resolve(|key| std::env::var(key).ok());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Pick the data directory from environment lookups: an explicit
/// `PRINTBRIDGE_DATA_DIR`, then the XDG data home, then `~/.local/share`,
/// then the temp directory.
fn resolve(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(explicit) = var("PRINTBRIDGE_DATA_DIR") {
        return PathBuf::from(explicit);
    }
    if let Some(xdg) = var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = var("HOME") {
        return PathBuf::from(home).join(".local").join("share").join(APP_DIR);
    }
    // Last resort
    std::env::temp_dir().join(APP_DIR)
}
