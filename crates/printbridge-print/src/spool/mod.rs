// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Self-healing print spool: detect jobs stuck in the OS spool directory and
// restart the spooling service with an empty queue.

pub mod monitor;
pub mod recovery;
pub mod snapshot;

pub use monitor::{CycleOutcome, MonitorState, SpoolMonitor};
pub use recovery::{RecoveryPlan, SpoolRecovery};
pub use snapshot::{FsSpool, SpoolEntry, SpoolSnapshot, SpoolSource};
