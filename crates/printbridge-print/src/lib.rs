// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printbridge-print: getting documents onto paper and keeping the spool
// healthy. The dispatcher decides between the direct and raster paths, the
// compositor fits rendered pages to the sheet, and the spool monitor clears a
// stalled print queue in the background.

pub mod compositor;
pub mod cups;
pub mod dispatcher;
pub mod pages;
pub mod spool;
pub mod target;

pub use cups::CupsTarget;
pub use dispatcher::{DispatchReport, PrintDispatcher, Strategy};
pub use pages::PageSequence;
pub use spool::{FsSpool, RecoveryPlan, SpoolMonitor, SpoolRecovery};
pub use target::{JobOptions, PageSink, PrintTarget};
