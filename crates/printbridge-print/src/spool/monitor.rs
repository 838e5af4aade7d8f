// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spool health monitor.
//
// On every tick: read the runtime settings, look at the spool directory, and
// if any file has been sitting there longer than the configured timeout, run
// the recovery sequence. A failed cycle is logged and the loop carries on;
// the next tick re-evaluates from scratch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use printbridge_core::config::SettingsProvider;
use printbridge_core::error::Result;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::recovery::SpoolRecovery;
use super::snapshot::SpoolSource;

/// Default time between checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Phase of the monitor's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Scanning,
    Clean,
    NeedsCleanup,
    CleaningUp,
}

/// How a single check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Auto-clean is switched off.
    Disabled,
    /// The spool directory could not be read on this host.
    SpoolUnavailable,
    /// No stale files.
    Clean,
    /// Stale files were found and the recovery sequence succeeded.
    Recovered,
    /// Stale files were found and a recovery step failed.
    RecoveryFailed,
}

pub struct SpoolMonitor {
    settings: Arc<dyn SettingsProvider>,
    source: Arc<dyn SpoolSource>,
    recovery: SpoolRecovery,
    interval: Duration,
    state: Mutex<MonitorState>,
    /// Held for the whole recovery sequence so background and on-demand
    /// cleanups never interleave.
    cleanup: Mutex<()>,
}

impl SpoolMonitor {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        source: Arc<dyn SpoolSource>,
        recovery: SpoolRecovery,
    ) -> Self {
        Self {
            settings,
            source,
            recovery,
            interval: DEFAULT_POLL_INTERVAL,
            state: Mutex::new(MonitorState::Idle),
            cleanup: Mutex::new(()),
        }
    }

    /// Change the polling period. Clamped to at least one second.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_secs(1));
        self
    }

    pub fn state(&self) -> MonitorState {
        *lock(&self.state)
    }

    fn set_state(&self, state: MonitorState) {
        *lock(&self.state) = state;
    }

    // -- Background loop ------------------------------------------------------

    /// Check the spool on every tick until `shutdown` is notified.
    ///
    /// Shutdown is only observed between cycles; a recovery already running
    /// finishes first. Checks run on the blocking pool so external commands
    /// never stall the async runtime.
    pub async fn run(self: Arc<Self>, shutdown: Arc<Notify>) {
        info!(
            interval_secs = self.interval.as_secs(),
            spool = %self.source.location().display(),
            "spool monitor started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.notified() => {
                    info!("spool monitor stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let monitor = Arc::clone(&self);
            match tokio::task::spawn_blocking(move || monitor.run_cycle()).await {
                Ok(outcome) => debug!(?outcome, "spool check finished"),
                Err(e) => {
                    error!(error = %e, "spool check aborted");
                    self.set_state(MonitorState::Idle);
                }
            }
        }
    }

    // -- Single cycle ---------------------------------------------------------

    pub fn run_cycle(&self) -> CycleOutcome {
        self.run_cycle_at(Utc::now())
    }

    /// One pass of the state machine with `now` as the current time.
    pub fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleOutcome {
        self.set_state(MonitorState::Scanning);
        let outcome = self.scan_and_recover(now);
        self.set_state(MonitorState::Idle);
        outcome
    }

    fn scan_and_recover(&self, now: DateTime<Utc>) -> CycleOutcome {
        let settings = self.settings.get_settings();
        if !settings.auto_clean_enabled {
            return CycleOutcome::Disabled;
        }

        let Some(snapshot) = self.source.snapshot() else {
            return CycleOutcome::SpoolUnavailable;
        };

        let timeout_minutes = settings.effective_timeout_minutes();
        let Some(cutoff) = cutoff(now, timeout_minutes) else {
            self.set_state(MonitorState::Clean);
            return CycleOutcome::Clean;
        };

        let Some(stale) = snapshot.find_stale(cutoff) else {
            debug!(files = snapshot.entries.len(), "spool is clean");
            self.set_state(MonitorState::Clean);
            return CycleOutcome::Clean;
        };

        warn!(
            file = %stale.file_name,
            created = %stale.created,
            timeout_minutes,
            "stale spool file found, starting recovery"
        );
        self.set_state(MonitorState::NeedsCleanup);

        match self.clean() {
            Ok(()) => CycleOutcome::Recovered,
            Err(e) => {
                error!(error = %e, "spool recovery failed, will retry on the next check");
                CycleOutcome::RecoveryFailed
            }
        }
    }

    // -- Recovery -------------------------------------------------------------

    /// Run the recovery sequence now, regardless of settings or spool
    /// contents. Waits for any recovery already in progress.
    pub fn clean_now(&self) -> Result<()> {
        info!("on-demand spool cleanup requested");
        let result = self.clean();
        self.set_state(MonitorState::Idle);
        result
    }

    fn clean(&self) -> Result<()> {
        let _guard = lock(&self.cleanup);
        self.set_state(MonitorState::CleaningUp);
        let result = self.recovery.run();
        if result.is_ok() {
            info!(spool = %self.source.location().display(), "spool recovered");
        }
        result
    }
}

/// `now - timeout_minutes`, or `None` if that instant is not representable.
fn cutoff(now: DateTime<Utc>, timeout_minutes: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(timeout_minutes).and_then(|timeout| now.checked_sub_signed(timeout))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use printbridge_core::config::{RuntimeSettings, SettingsStore};
    use printbridge_core::error::PrintBridgeError;
    use printbridge_core::exec::{CommandExecutor, CommandOutput, CommandSpec};

    use super::*;
    use crate::spool::recovery::RecoveryPlan;
    use crate::spool::snapshot::{SpoolEntry, SpoolSnapshot};

    // -- Fakes ----------------------------------------------------------------

    /// Records every command; fails the first command whose program line
    /// contains `fail_on`.
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingExecutor {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for RecordingExecutor {
        fn run(&self, command: &CommandSpec) -> CommandOutput {
            let line = command.to_string();
            self.calls.lock().unwrap().push(line.clone());
            match self.fail_on {
                Some(needle) if line.contains(needle) => CommandOutput {
                    exit_code: 5,
                    stderr: "Failed to stop cups.service: Access denied".into(),
                },
                _ => CommandOutput::success(),
            }
        }
    }

    struct FakeSpool {
        snapshot: Option<SpoolSnapshot>,
        dir: PathBuf,
    }

    impl FakeSpool {
        fn with_ages(now: DateTime<Utc>, minutes_ago: &[i64]) -> Self {
            let entries = minutes_ago
                .iter()
                .enumerate()
                .map(|(i, &age)| SpoolEntry {
                    file_name: format!("{i:05}.SPL"),
                    created: now - TimeDelta::minutes(age),
                })
                .collect();
            Self {
                snapshot: Some(SpoolSnapshot { entries }),
                dir: PathBuf::from("/var/spool/cups"),
            }
        }

        fn unavailable() -> Self {
            Self {
                snapshot: None,
                dir: PathBuf::from("/var/spool/cups"),
            }
        }
    }

    impl SpoolSource for FakeSpool {
        fn snapshot(&self) -> Option<SpoolSnapshot> {
            self.snapshot.clone()
        }

        fn location(&self) -> &Path {
            &self.dir
        }
    }

    const STOP: &str = "systemctl stop cups";
    const PURGE: &str = "find /var/spool/cups -mindepth 1 -delete";
    const START: &str = "systemctl start cups";

    fn settings(enabled: bool, timeout: i64) -> Arc<SettingsStore> {
        Arc::new(SettingsStore::in_memory(RuntimeSettings {
            auto_clean_enabled: enabled,
            auto_clean_timeout_minutes: timeout,
            ..RuntimeSettings::default()
        }))
    }

    fn monitor(
        settings: Arc<SettingsStore>,
        spool: FakeSpool,
        executor: Arc<RecordingExecutor>,
    ) -> SpoolMonitor {
        let recovery = SpoolRecovery::new(executor, RecoveryPlan::cups(Path::new("/var/spool/cups")));
        SpoolMonitor::new(settings, Arc::new(spool), recovery)
    }

    // -- Cycles ---------------------------------------------------------------

    #[test]
    fn file_older_than_timeout_triggers_full_recovery_in_order() {
        let now = Utc::now();
        let exec = Arc::new(RecordingExecutor::default());
        let m = monitor(settings(true, 20), FakeSpool::with_ages(now, &[2, 21]), exec.clone());

        assert_eq!(m.run_cycle_at(now), CycleOutcome::Recovered);
        assert_eq!(exec.calls(), [STOP, PURGE, START]);
        assert_eq!(m.state(), MonitorState::Idle);
    }

    #[test]
    fn recent_files_leave_the_spool_alone() {
        let now = Utc::now();
        let exec = Arc::new(RecordingExecutor::default());
        let m = monitor(settings(true, 20), FakeSpool::with_ages(now, &[0, 5, 19]), exec.clone());

        assert_eq!(m.run_cycle_at(now), CycleOutcome::Clean);
        assert!(exec.calls().is_empty());
        assert_eq!(m.state(), MonitorState::Idle);
    }

    #[test]
    fn disabled_auto_clean_is_a_no_op() {
        let now = Utc::now();
        let exec = Arc::new(RecordingExecutor::default());
        let m = monitor(settings(false, 20), FakeSpool::with_ages(now, &[500]), exec.clone());

        assert_eq!(m.run_cycle_at(now), CycleOutcome::Disabled);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn unreadable_spool_is_a_no_op() {
        let exec = Arc::new(RecordingExecutor::default());
        let m = monitor(settings(true, 20), FakeSpool::unavailable(), exec.clone());

        assert_eq!(m.run_cycle(), CycleOutcome::SpoolUnavailable);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn non_positive_timeout_falls_back_to_twenty_minutes() {
        let now = Utc::now();
        for timeout in [0, -5] {
            let exec = Arc::new(RecordingExecutor::default());
            let m = monitor(settings(true, timeout), FakeSpool::with_ages(now, &[19]), exec.clone());
            assert_eq!(m.run_cycle_at(now), CycleOutcome::Clean, "timeout {timeout}");

            let m = monitor(settings(true, timeout), FakeSpool::with_ages(now, &[21]), exec.clone());
            assert_eq!(m.run_cycle_at(now), CycleOutcome::Recovered, "timeout {timeout}");
        }
    }

    #[test]
    fn enormous_timeout_never_flags_anything() {
        let now = Utc::now();
        let exec = Arc::new(RecordingExecutor::default());
        let m = monitor(settings(true, i64::MAX), FakeSpool::with_ages(now, &[100_000]), exec.clone());
        assert_eq!(m.run_cycle_at(now), CycleOutcome::Clean);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn failed_stop_skips_remaining_steps() {
        let now = Utc::now();
        let exec = Arc::new(RecordingExecutor {
            fail_on: Some("stop"),
            ..Default::default()
        });
        let m = monitor(settings(true, 20), FakeSpool::with_ages(now, &[30]), exec.clone());

        assert_eq!(m.run_cycle_at(now), CycleOutcome::RecoveryFailed);
        assert_eq!(exec.calls(), [STOP]);
        assert_eq!(m.state(), MonitorState::Idle);

        // The next cycle tries again from the start.
        assert_eq!(m.run_cycle_at(now), CycleOutcome::RecoveryFailed);
        assert_eq!(exec.calls(), [STOP, STOP]);
    }

    #[test]
    fn failed_purge_leaves_service_stopped() {
        let now = Utc::now();
        let exec = Arc::new(RecordingExecutor {
            fail_on: Some("-delete"),
            ..Default::default()
        });
        let m = monitor(settings(true, 20), FakeSpool::with_ages(now, &[30]), exec.clone());

        assert_eq!(m.run_cycle_at(now), CycleOutcome::RecoveryFailed);
        assert_eq!(exec.calls(), [STOP, PURGE]);
    }

    #[test]
    fn clean_now_ignores_settings_and_reports_failures() {
        let exec = Arc::new(RecordingExecutor::default());
        let m = monitor(settings(false, 20), FakeSpool::unavailable(), exec.clone());
        m.clean_now().unwrap();
        assert_eq!(exec.calls(), [STOP, PURGE, START]);

        let exec = Arc::new(RecordingExecutor {
            fail_on: Some("start"),
            ..Default::default()
        });
        let m = monitor(settings(false, 20), FakeSpool::unavailable(), exec.clone());
        match m.clean_now().unwrap_err() {
            PrintBridgeError::CommandFailure { command, exit_code, .. } => {
                assert_eq!(command, START);
                assert_eq!(exit_code, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(m.state(), MonitorState::Idle);
    }

    // -- Loop -----------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn loop_checks_on_every_tick_and_stops_on_shutdown() {
        let exec = Arc::new(RecordingExecutor::default());
        let spool = FakeSpool::with_ages(Utc::now(), &[60]);
        let m = Arc::new(monitor(settings(true, 20), spool, exec.clone()).with_interval(Duration::from_secs(60)));

        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(Arc::clone(&m).run(Arc::clone(&shutdown)));

        // First tick fires immediately, the second after one interval.
        wait_for_calls(&exec, 3).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        wait_for_calls(&exec, 6).await;

        shutdown.notify_one();
        handle.await.unwrap();
        assert_eq!(exec.calls().len(), 6);
        assert_eq!(m.state(), MonitorState::Idle);
    }

    #[tokio::test]
    async fn shutdown_before_first_tick_runs_nothing() {
        let exec = Arc::new(RecordingExecutor::default());
        let m = Arc::new(monitor(settings(true, 20), FakeSpool::with_ages(Utc::now(), &[60]), exec.clone()));

        let shutdown = Arc::new(Notify::new());
        shutdown.notify_one();
        Arc::clone(&m).run(shutdown).await;
        assert!(exec.calls().is_empty());
    }

    /// Yield until the blocking check has recorded `n` commands.
    async fn wait_for_calls(exec: &RecordingExecutor, n: usize) {
        for _ in 0..1000 {
            if exec.calls().len() >= n {
                return;
            }
            tokio::task::yield_now().await;
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("expected {n} commands, saw {:?}", exec.calls());
    }
}
