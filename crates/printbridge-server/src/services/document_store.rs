// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uploaded document storage.
//
// Each upload is written as `<uuid><ext>` in the uploads directory and looked
// up again by its UUID. Identifiers that are not UUIDs are rejected before
// they get anywhere near a path.

use std::path::{Path, PathBuf};

use printbridge_core::error::{PrintBridgeError, Result};
use printbridge_core::types::FileKind;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Receipt for a stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    pub id: String,
    /// Name the client uploaded the file under.
    pub filename: String,
    /// Extension including the dot, e.g. `.pdf`.
    #[serde(rename = "type")]
    pub extension: String,
}

pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Open (and create if needed) the store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `data` under a fresh id. Only printable file kinds are accepted.
    pub fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredDocument> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if FileKind::from_extension(&ext).is_none() {
            return Err(PrintBridgeError::UnsupportedFileKind(if ext.is_empty() {
                original_name.to_string()
            } else {
                format!(".{ext}")
            }));
        }

        let id = Uuid::new_v4().to_string();
        let path = self.dir.join(format!("{id}.{ext}"));
        std::fs::write(&path, data)?;

        info!(id = %id, name = original_name, bytes = data.len(), "document stored");
        Ok(StoredDocument {
            id,
            filename: original_name.to_string(),
            extension: format!(".{ext}"),
        })
    }

    /// Path of the stored document with `id`.
    pub fn find(&self, id: &str) -> Result<PathBuf> {
        let not_found = || PrintBridgeError::NotFound(format!("document {id}"));

        let id = Uuid::parse_str(id).map_err(|_| not_found())?.to_string();
        for entry in std::fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(id.as_str()) && path.is_file() {
                debug!(id = %id, path = %path.display(), "document resolved");
                return Ok(path);
            }
        }
        Err(not_found())
    }
}
