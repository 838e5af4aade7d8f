// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Point-in-time view of the OS spool directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

/// One file found in the spool directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolEntry {
    pub file_name: String,
    pub created: DateTime<Utc>,
}

/// Files present in the spool directory when it was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpoolSnapshot {
    pub entries: Vec<SpoolEntry>,
}

impl SpoolSnapshot {
    /// First entry created before `cutoff`, if any.
    pub fn find_stale(&self, cutoff: DateTime<Utc>) -> Option<&SpoolEntry> {
        self.entries.iter().find(|entry| entry.created < cutoff)
    }
}

/// Where spool snapshots come from.
pub trait SpoolSource: Send + Sync {
    /// Read the spool directory, or `None` when it cannot be read on this
    /// host (missing, or not permitted).
    fn snapshot(&self) -> Option<SpoolSnapshot>;

    /// Directory being watched.
    fn location(&self) -> &Path;
}

/// Spool directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsSpool {
    dir: PathBuf,
}

impl FsSpool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SpoolSource for FsSpool {
    fn snapshot(&self) -> Option<SpoolSnapshot> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "spool directory not readable");
                return None;
            }
        };

        let mut snapshot = SpoolSnapshot::default();
        for entry in entries.flatten() {
            // Files can vanish between listing and stat while the spooler
            // works; skip those.
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(created) = metadata.created().or_else(|_| metadata.modified()) else {
                continue;
            };
            snapshot.entries.push(SpoolEntry {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                created: created.into(),
            });
        }
        Some(snapshot)
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}
