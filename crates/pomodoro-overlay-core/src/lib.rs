//! # Pomodoro Overlay Core Library
//!
//! Business logic for a small always-on-top Pomodoro timer: the work/break
//! phase engine, plus the settings and task-list collaborators the host
//! shell wires around it.
//!
//! ## Architecture
//!
//! - **Phase Engine**: a tick-driven state machine. It schedules its own
//!   one-second ticks through an injected [`Scheduler`] and reports back to
//!   the host through [`TimerHooks`]
//! - **Storage**: `config.json` settings and a plain-text `tasks.txt`
//! - **Tasks**: free-text task list with `+` done markers
//! - **Theme**: light/dark colour palettes
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: Core timer state machine
//! - [`TickQueue`]: Deterministic scheduler used by tests and hosts
//! - [`Settings`]: Overlay configuration
//! - [`TaskList`]: Parsed task list

pub mod error;
pub mod events;
pub mod storage;
pub mod task;
pub mod theme;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{Event, TimerHooks};
pub use storage::{Settings, Store};
pub use task::{Task, TaskList, TaskProgress};
pub use theme::{Palette, Theme};
pub use timer::{
    format_mmss, DurationSource, Durations, Phase, PhaseEngine, ScheduleHandle, Scheduler,
    TickQueue, TickToken, TimerSnapshot,
};
