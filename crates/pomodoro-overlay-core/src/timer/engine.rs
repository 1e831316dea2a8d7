//! Phase engine implementation.
//!
//! The phase engine is a tick-driven state machine. It does not own a thread
//! or a clock: each running countdown keeps exactly one tick outstanding in
//! the injected [`Scheduler`], and the host feeds due ticks back through
//! [`PhaseEngine::on_tick`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle(Work) --start--> Running(Work) --expiry--> Idle(Break)
//! Idle(Break) --start--> Running(Break) --expiry--> Idle(Work)
//! Running --pause--> Idle (partial remaining kept)
//! any --reset--> Idle(Work, full)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseEngine::new(TickQueue::new(), || durations, TimerHooks::default());
//! engine.start();
//! engine.advance(Duration::from_secs(1)); // fires the first tick
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::display::format_mmss;
use super::phase::Phase;
use super::scheduler::{ScheduleHandle, Scheduler, TickQueue, TickToken};
use crate::events::TimerHooks;

/// Delay between consecutive countdown ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Interval lengths, in minutes, read from the settings collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Durations {
    pub fn minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Countdown length; never shorter than a minute.
    pub fn seconds(&self, phase: Phase) -> u64 {
        u64::from(self.minutes(phase).max(1)) * 60
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

/// Live source of interval lengths. Queried on every (re)start and
/// (re)selection, never cached by the engine.
pub trait DurationSource {
    fn durations(&self) -> Durations;
}

impl<F> DurationSource for F
where
    F: Fn() -> Durations,
{
    fn durations(&self) -> Durations {
        self()
    }
}

/// Serializable view of the engine for hosts that render or report state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub selected_mode: Phase,
    pub running: bool,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub remaining_fraction: f64,
    pub display: String,
}

/// Work/break countdown state machine.
pub struct PhaseEngine<S: Scheduler, C: DurationSource> {
    scheduler: S,
    source: C,
    hooks: TimerHooks,
    phase: Phase,
    selected_mode: Phase,
    remaining_seconds: u64,
    total_seconds: u64,
    running: bool,
    pending: Option<ScheduleHandle>,
    /// Bumped whenever the tick chain is started or torn down.
    generation: u64,
}

impl<S: Scheduler, C: DurationSource> PhaseEngine<S, C> {
    /// Create an idle engine staged at the full work duration.
    pub fn new(scheduler: S, source: C, hooks: TimerHooks) -> Self {
        let remaining = source.durations().seconds(Phase::Work);
        Self {
            scheduler,
            source,
            hooks,
            phase: Phase::Work,
            selected_mode: Phase::Work,
            remaining_seconds: remaining,
            total_seconds: remaining,
            running: false,
            pending: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_mode(&self) -> Phase {
        self.selected_mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    /// 1.0 at the start of a countdown, 0.0 at expiry or when nothing is staged.
    pub fn remaining_fraction(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        self.remaining_seconds as f64 / self.total_seconds as f64
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            selected_mode: self.selected_mode,
            running: self.running,
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
            remaining_fraction: self.remaining_fraction(),
            display: format_mmss(self.remaining_seconds),
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Stage `mode` at its full duration. Ignored while running.
    pub fn select_mode(&mut self, mode: Phase) {
        if self.running {
            debug!(mode = %mode, "mode selection ignored while running");
            return;
        }
        self.selected_mode = mode;
        self.stage(mode);
    }

    /// Begin (or resume) counting down the staged interval.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        if self.remaining_seconds == 0 {
            let mode = self.selected_mode;
            self.remaining_seconds = self.source.durations().seconds(mode);
            self.phase = mode;
            (self.hooks.on_phase_changed)(mode);
        }
        self.total_seconds = self.remaining_seconds;
        self.running = true;
        self.cancel_pending();
        self.generation += 1;
        self.schedule_next();
        info!(phase = %self.phase, remaining = self.remaining_seconds, "countdown started");
        (self.hooks.on_run_state_changed)(true);
    }

    /// Stop ticking, keeping the partial remaining time.
    pub fn pause(&mut self) {
        self.cancel_pending();
        self.generation += 1;
        if !self.running {
            return;
        }
        self.running = false;
        info!(phase = %self.phase, remaining = self.remaining_seconds, "countdown paused");
        (self.hooks.on_run_state_changed)(false);
    }

    /// Hotkey semantics: pause a running countdown, otherwise start one.
    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Pause, then stage the full work interval.
    pub fn reset(&mut self) {
        self.pause();
        self.selected_mode = Phase::Work;
        self.stage(Phase::Work);
    }

    /// Re-derive the staged interval from current settings. Ignored while running.
    pub fn refresh_display(&mut self) {
        if self.running {
            return;
        }
        self.stage(self.selected_mode);
    }

    /// Stage the full break interval, e.g. after the host handles a finished
    /// work interval itself. Ignored while running.
    pub fn start_break(&mut self) {
        self.select_mode(Phase::Break);
    }

    /// Deliver a scheduled tick.
    ///
    /// Tokens from a torn-down tick chain are dropped, so a late delivery
    /// after [`pause`](Self::pause) or [`reset`](Self::reset) cannot mutate
    /// state.
    pub fn on_tick(&mut self, token: TickToken) {
        if token.generation != self.generation {
            debug!(
                token = token.generation,
                current = self.generation,
                "dropping stale tick"
            );
            return;
        }
        self.pending = None;
        if !self.running || self.remaining_seconds == 0 {
            return;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds > 0 {
            self.schedule_next();
            return;
        }

        let finished = self.phase;
        self.running = false;
        self.generation += 1;
        (self.hooks.on_run_state_changed)(false);
        info!(phase = %finished, "countdown finished");
        (self.hooks.on_finish)(finished);

        let next = finished.other();
        self.selected_mode = next;
        self.stage(next);
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Set phase and full duration for `phase`, then notify.
    fn stage(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining_seconds = self.source.durations().seconds(phase);
        self.total_seconds = self.remaining_seconds;
        (self.hooks.on_phase_changed)(phase);
    }

    fn schedule_next(&mut self) {
        let token = TickToken {
            generation: self.generation,
        };
        self.pending = Some(self.scheduler.schedule_after(TICK_INTERVAL, token));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<C: DurationSource> PhaseEngine<TickQueue, C> {
    /// Move the queue's clock forward by `by`, delivering every tick that
    /// comes due. Returns the number of ticks delivered.
    pub fn advance(&mut self, by: Duration) -> usize {
        let target = self.scheduler.now() + by;
        self.advance_to(target)
    }

    /// Deliver every tick due at or before `at` on the queue's timeline.
    pub fn advance_to(&mut self, at: Duration) -> usize {
        let mut delivered = 0;
        while let Some(token) = self.scheduler.pop_due(at) {
            self.on_tick(token);
            delivered += 1;
        }
        self.scheduler.set_now(at);
        delivered
    }
}

impl<S: Scheduler, C: DurationSource> Drop for PhaseEngine<S, C> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl<S: Scheduler, C: DurationSource> std::fmt::Debug for PhaseEngine<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseEngine")
            .field("phase", &self.phase)
            .field("selected_mode", &self.selected_mode)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("total_seconds", &self.total_seconds)
            .field("running", &self.running)
            .field("generation", &self.generation)
            .finish()
    }
}
