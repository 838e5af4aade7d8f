// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print bridge: core types, runtime settings, error taxonomy and external
// command execution shared across all crates.

pub mod config;
pub mod error;
pub mod exec;
pub mod human_errors;
pub mod types;

pub use config::{RuntimeSettings, SettingsProvider, SettingsStore};
pub use error::PrintBridgeError;
pub use exec::{CommandExecutor, CommandOutput, CommandSpec, SystemExecutor};
pub use types::*;
