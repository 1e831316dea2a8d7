//! Delayed-callback scheduling for the phase engine.
//!
//! The engine never sleeps. It asks a [`Scheduler`] to deliver a
//! [`TickToken`] after a delay, and the host hands that token back to
//! [`PhaseEngine::on_tick`](super::PhaseEngine::on_tick) when it comes due.
//!
//! [`TickQueue`] is the only implementation: a virtual millisecond timeline
//! that tests advance synchronously and a real-time host advances from a
//! monotonic clock.

use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies one scheduled delivery so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(u64);

/// Payload delivered back to the engine when a scheduled tick fires.
///
/// Carries the engine generation that was current when the tick was
/// scheduled; a token from an older generation is ignored at fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    pub generation: u64,
}

pub trait Scheduler {
    fn schedule_after(&mut self, delay: Duration, token: TickToken) -> ScheduleHandle;
    fn cancel(&mut self, handle: ScheduleHandle);
}

/// Deterministic scheduler over a virtual millisecond timeline.
#[derive(Debug, Default)]
pub struct TickQueue {
    now_ms: u64,
    next_handle: u64,
    /// Keyed by (deadline, handle) so equal deadlines fire in scheduling order.
    pending: BTreeMap<(u64, ScheduleHandle), TickToken>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position on the virtual timeline.
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Delay from now until the earliest pending delivery.
    pub fn until_next(&self) -> Option<Duration> {
        self.pending
            .keys()
            .next()
            .map(|(due, _)| Duration::from_millis(due.saturating_sub(self.now_ms)))
    }

    /// Remove and return the earliest delivery due at or before `deadline`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<TickToken> {
        let deadline_ms = duration_ms(deadline);
        let key = *self.pending.keys().next()?;
        if key.0 > deadline_ms {
            return None;
        }
        let token = self.pending.remove(&key)?;
        self.now_ms = self.now_ms.max(key.0);
        Some(token)
    }

    /// Move the clock forward to `at`. Never moves backwards.
    pub fn set_now(&mut self, at: Duration) {
        self.now_ms = self.now_ms.max(duration_ms(at));
    }
}

impl Scheduler for TickQueue {
    fn schedule_after(&mut self, delay: Duration, token: TickToken) -> ScheduleHandle {
        let handle = ScheduleHandle(self.next_handle);
        self.next_handle += 1;
        let due = self.now_ms.saturating_add(duration_ms(delay));
        self.pending.insert((due, handle), token);
        handle
    }

    fn cancel(&mut self, handle: ScheduleHandle) {
        self.pending.retain(|(_, h), _| *h != handle);
    }
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule_after(&mut self, delay: Duration, token: TickToken) -> ScheduleHandle {
        (**self).schedule_after(delay, token)
    }

    fn cancel(&mut self, handle: ScheduleHandle) {
        (**self).cancel(handle)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
