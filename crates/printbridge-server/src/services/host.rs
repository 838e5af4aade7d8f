// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-level admin actions.

use printbridge_core::error::Result;
use printbridge_core::exec::{CommandExecutor, CommandSpec};
use tracing::warn;

/// Command that reboots this machine immediately.
pub fn restart_command() -> CommandSpec {
    if cfg!(windows) {
        CommandSpec::new("shutdown").args(["/r", "/t", "0"])
    } else {
        CommandSpec::new("systemctl").arg("reboot")
    }
}

/// Reboot the host. Returns once the reboot has been requested.
pub fn restart(executor: &dyn CommandExecutor) -> Result<()> {
    let command = restart_command();
    warn!(command = %command, "host restart requested");
    executor.run(&command).check(&command)
}
