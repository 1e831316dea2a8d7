use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every notification the phase engine emits to its host.
///
/// Hosts that prefer a single stream over three sinks can wire
/// [`TimerHooks::from_event_sink`] and match on this enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A countdown reached zero in `phase`.
    Finished {
        phase: Phase,
        at: DateTime<Utc>,
    },
    RunStateChanged {
        running: bool,
        at: DateTime<Utc>,
    },
    /// The staged or active phase was (re)derived.
    PhaseChanged {
        phase: Phase,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Same variant and payload, ignoring the timestamp.
    pub fn same_as(&self, other: &Event) -> bool {
        match (self, other) {
            (Event::Finished { phase: a, .. }, Event::Finished { phase: b, .. }) => a == b,
            (Event::RunStateChanged { running: a, .. }, Event::RunStateChanged { running: b, .. }) => {
                a == b
            }
            (Event::PhaseChanged { phase: a, .. }, Event::PhaseChanged { phase: b, .. }) => a == b,
            _ => false,
        }
    }
}

type PhaseSink = Box<dyn FnMut(Phase)>;
type RunStateSink = Box<dyn FnMut(bool)>;

/// Notification sinks injected into the engine at construction.
pub struct TimerHooks {
    pub on_finish: PhaseSink,
    pub on_run_state_changed: RunStateSink,
    pub on_phase_changed: PhaseSink,
}

impl Default for TimerHooks {
    fn default() -> Self {
        Self {
            on_finish: Box::new(|_| {}),
            on_run_state_changed: Box::new(|_| {}),
            on_phase_changed: Box::new(|_| {}),
        }
    }
}

impl TimerHooks {
    pub fn on_finish(mut self, f: impl FnMut(Phase) + 'static) -> Self {
        self.on_finish = Box::new(f);
        self
    }

    pub fn on_run_state_changed(mut self, f: impl FnMut(bool) + 'static) -> Self {
        self.on_run_state_changed = Box::new(f);
        self
    }

    pub fn on_phase_changed(mut self, f: impl FnMut(Phase) + 'static) -> Self {
        self.on_phase_changed = Box::new(f);
        self
    }

    /// Route all three sinks into one event consumer.
    pub fn from_event_sink<F>(sink: F) -> Self
    where
        F: FnMut(Event) + 'static,
    {
        let sink = Rc::new(RefCell::new(sink));
        let finish = Rc::clone(&sink);
        let run_state = Rc::clone(&sink);
        Self {
            on_finish: Box::new(move |phase| {
                (&mut *finish.borrow_mut())(Event::Finished { phase, at: Utc::now() })
            }),
            on_run_state_changed: Box::new(move |running| {
                (&mut *run_state.borrow_mut())(Event::RunStateChanged { running, at: Utc::now() })
            }),
            on_phase_changed: Box::new(move |phase| {
                (&mut *sink.borrow_mut())(Event::PhaseChanged { phase, at: Utc::now() })
            }),
        }
    }
}

impl std::fmt::Debug for TimerHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHooks").finish_non_exhaustive()
    }
}
