// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the print bridge.

use thiserror::Error;

/// Top-level error type for all print bridge operations.
#[derive(Debug, Error)]
pub enum PrintBridgeError {
    // -- Dispatch errors --
    #[error("printing is not supported on this host: {0}")]
    PlatformUnsupported(String),

    #[error("unsupported file kind: {0}")]
    UnsupportedFileKind(String),

    #[error("document could not be loaded: {0}")]
    LoadError(String),

    #[error("rendering page {page} failed: {message}")]
    RenderFailure { page: usize, message: String },

    #[error("printing subsystem rejected the job: {0}")]
    DeviceFailure(String),

    // -- Spool recovery --
    #[error("command `{command}` exited with status {exit_code}: {stderr}")]
    CommandFailure {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    // -- Lookup / request validation --
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintBridgeError>;
