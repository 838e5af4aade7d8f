// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spool recovery: stop the spooling service, empty the spool directory,
// start the service again.
//
// The sequence is not transactional. If deleting or restarting fails after
// the stop succeeded, the spooling service is left stopped until the next
// recovery attempt (or an operator) starts it.

use std::path::Path;
use std::sync::Arc;

use printbridge_core::error::Result;
use printbridge_core::exec::{CommandExecutor, CommandSpec};
use tracing::{error, info};

/// The three commands of a recovery, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    pub stop_service: CommandSpec,
    pub purge_spool: CommandSpec,
    pub start_service: CommandSpec,
}

impl RecoveryPlan {
    /// Plan for the platform this binary was built for.
    pub fn for_host(spool_dir: &Path) -> Self {
        if cfg!(windows) {
            Self::windows(spool_dir)
        } else {
            Self::cups(spool_dir)
        }
    }

    /// Windows print spooler service, driven through PowerShell.
    pub fn windows(spool_dir: &Path) -> Self {
        let powershell = |script: String| {
            CommandSpec::new("powershell.exe")
                .args(["-NoProfile", "-NonInteractive", "-Command"])
                .arg(script)
        };
        Self {
            stop_service: powershell("Stop-Service -Name Spooler -Force".into()),
            purge_spool: powershell(format!(
                "Remove-Item \"{}\\*\" -Force -Recurse",
                spool_dir.display()
            )),
            start_service: powershell("Start-Service -Name Spooler".into()),
        }
    }

    /// CUPS under systemd.
    pub fn cups(spool_dir: &Path) -> Self {
        Self {
            stop_service: CommandSpec::new("systemctl").args(["stop", "cups"]),
            purge_spool: CommandSpec::new("find")
                .arg(spool_dir.display().to_string())
                .args(["-mindepth", "1", "-delete"]),
            start_service: CommandSpec::new("systemctl").args(["start", "cups"]),
        }
    }

    pub fn steps(&self) -> [&CommandSpec; 3] {
        [&self.stop_service, &self.purge_spool, &self.start_service]
    }
}

/// Runs a [`RecoveryPlan`] through a command executor.
pub struct SpoolRecovery {
    executor: Arc<dyn CommandExecutor>,
    plan: RecoveryPlan,
}

impl SpoolRecovery {
    pub fn new(executor: Arc<dyn CommandExecutor>, plan: RecoveryPlan) -> Self {
        Self { executor, plan }
    }

    /// Run every step in order, stopping at the first non-zero exit.
    pub fn run(&self) -> Result<()> {
        for (index, step) in self.plan.steps().into_iter().enumerate() {
            let output = self.executor.run(step);
            if let Err(e) = output.check(step) {
                error!(
                    step = index + 1,
                    command = %step,
                    error = %e,
                    "spool recovery step failed, remaining steps skipped"
                );
                return Err(e);
            }
            info!(step = index + 1, command = %step, "spool recovery step completed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn cups_plan_targets_the_spool_directory() {
        let plan = RecoveryPlan::cups(&PathBuf::from("/var/spool/cups"));
        assert_eq!(plan.stop_service.to_string(), "systemctl stop cups");
        assert_eq!(plan.purge_spool.to_string(), "find /var/spool/cups -mindepth 1 -delete");
        assert_eq!(plan.start_service.to_string(), "systemctl start cups");
    }

    #[test]
    fn windows_plan_uses_the_spooler_service() {
        let plan = RecoveryPlan::windows(Path::new(r"C:\Windows\System32\spool\PRINTERS"));
        let scripts: Vec<&str> = plan
            .steps()
            .iter()
            .map(|s| s.args.last().unwrap().as_str())
            .collect();
        assert_eq!(
            scripts,
            [
                "Stop-Service -Name Spooler -Force",
                r#"Remove-Item "C:\Windows\System32\spool\PRINTERS\*" -Force -Recurse"#,
                "Start-Service -Name Spooler",
            ]
        );
        assert!(plan.steps().iter().all(|s| s.program == "powershell.exe"));
    }
}
