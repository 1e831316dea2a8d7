mod display;
mod engine;
mod phase;
mod scheduler;

pub use display::{format_mmss, progress_bar};
pub use engine::{DurationSource, Durations, PhaseEngine, TimerSnapshot, TICK_INTERVAL};
pub use phase::Phase;
pub use scheduler::{ScheduleHandle, Scheduler, TickQueue, TickToken};
