//! Integration tests for the work/break phase engine.
//!
//! Time is driven through the deterministic `TickQueue`, one virtual second
//! per tick.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use pomodoro_overlay_core::{Durations, Event, Phase, PhaseEngine, TickQueue, TickToken, TimerHooks};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Finish(Phase),
    Running(bool),
    PhaseChanged(Phase),
}

type Log = Rc<RefCell<Vec<Seen>>>;

fn recording_hooks(log: &Log) -> TimerHooks {
    let (a, b, c) = (Rc::clone(log), Rc::clone(log), Rc::clone(log));
    TimerHooks::default()
        .on_finish(move |p| a.borrow_mut().push(Seen::Finish(p)))
        .on_run_state_changed(move |r| b.borrow_mut().push(Seen::Running(r)))
        .on_phase_changed(move |p| c.borrow_mut().push(Seen::PhaseChanged(p)))
}

fn fixed(work: u32, brk: u32) -> impl Fn() -> Durations {
    move || Durations {
        work_minutes: work,
        break_minutes: brk,
    }
}

fn ticks(engine: &mut PhaseEngine<TickQueue, impl Fn() -> Durations>, n: u64) {
    for _ in 0..n {
        engine.advance(Duration::from_secs(1));
    }
}

#[test]
fn full_work_interval_switches_to_break() {
    let log: Log = Rc::default();
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), recording_hooks(&log));
    assert_eq!(engine.remaining_seconds(), 1500);

    engine.start();
    ticks(&mut engine, 1500);

    assert!(!engine.is_running());
    assert_eq!(engine.phase(), Phase::Break);
    assert_eq!(engine.remaining_seconds(), 300);
    assert_eq!(engine.remaining_fraction(), 1.0);

    let log = log.borrow();
    assert_eq!(
        log.iter().filter(|s| **s == Seen::Finish(Phase::Work)).count(),
        1
    );
    let finish_at = log.iter().position(|s| *s == Seen::Finish(Phase::Work)).unwrap();
    assert_eq!(
        &log[finish_at - 1..],
        &[
            Seen::Running(false),
            Seen::Finish(Phase::Work),
            Seen::PhaseChanged(Phase::Break)
        ]
    );
}

#[test]
fn double_start_keeps_single_tick_chain() {
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), TimerHooks::default());
    engine.start();
    engine.start();
    assert_eq!(engine.scheduler().pending_len(), 1);

    ticks(&mut engine, 10);
    assert_eq!(engine.remaining_seconds(), engine.total_seconds() - 10);
    assert!(engine.is_running());
}

#[test]
fn double_start_fires_run_state_once() {
    let log: Log = Rc::default();
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), recording_hooks(&log));
    engine.start();
    engine.start();
    assert_eq!(*log.borrow(), vec![Seen::Running(true)]);
}

#[test]
fn ticks_after_pause_do_not_mutate_state() {
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), TimerHooks::default());
    engine.start();
    ticks(&mut engine, 5);
    engine.pause();
    let before = engine.snapshot();

    // A racing scheduler delivering tokens from the cancelled chain.
    for generation in 0..=3 {
        engine.on_tick(TickToken { generation });
    }
    ticks(&mut engine, 5);
    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.remaining_seconds(), 1495);

    engine.reset();
    assert_eq!(engine.phase(), Phase::Work);
    assert_eq!(engine.remaining_seconds(), 1500);
}

#[test]
fn select_mode_while_running_is_a_no_op() {
    let log: Log = Rc::default();
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), recording_hooks(&log));
    engine.start();
    ticks(&mut engine, 3);
    let before = engine.snapshot();
    let events_before = log.borrow().len();

    engine.select_mode(Phase::Break);
    engine.start_break();
    engine.refresh_display();

    assert_eq!(engine.snapshot(), before);
    assert_eq!(log.borrow().len(), events_before);
}

#[test]
fn selection_always_restores_full_duration() {
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), TimerHooks::default());
    engine.start();
    ticks(&mut engine, 42);
    engine.pause();

    engine.select_mode(Phase::Break);
    assert_eq!(engine.phase(), Phase::Break);
    assert_eq!(engine.remaining_seconds(), 300);

    engine.select_mode(Phase::Work);
    assert_eq!(engine.phase(), Phase::Work);
    assert_eq!(engine.remaining_seconds(), 1500);
    assert_eq!(engine.total_seconds(), 1500);
}

#[test]
fn reset_from_break_fires_work_phase() {
    let log: Log = Rc::default();
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(25, 5), recording_hooks(&log));
    engine.select_mode(Phase::Break);
    engine.start();
    ticks(&mut engine, 2);
    engine.reset();

    assert!(!engine.is_running());
    assert_eq!(engine.selected_mode(), Phase::Work);
    assert_eq!(engine.remaining_seconds(), 1500);
    assert_eq!(
        log.borrow().last().copied(),
        Some(Seen::PhaseChanged(Phase::Work))
    );
    assert_eq!(engine.scheduler().pending_len(), 0);
}

#[test]
fn settings_edited_while_idle_apply_to_next_interval() {
    let minutes = Rc::new(Cell::new((1, 1)));
    let m = Rc::clone(&minutes);
    let mut engine = PhaseEngine::new(
        TickQueue::new(),
        move || {
            let (work_minutes, break_minutes) = m.get();
            Durations {
                work_minutes,
                break_minutes,
            }
        },
        TimerHooks::default(),
    );

    engine.start();
    minutes.set((1, 3));
    ticks(&mut engine, 60);

    assert_eq!(engine.phase(), Phase::Break);
    assert_eq!(engine.remaining_seconds(), 180);
}

#[test]
fn one_large_advance_delivers_every_tick() {
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(1, 1), TimerHooks::default());
    engine.start();
    assert_eq!(engine.advance(Duration::from_secs(30)), 30);
    assert_eq!(engine.remaining_seconds(), 30);

    // Expiry ends the chain; further time delivers nothing.
    assert_eq!(engine.advance(Duration::from_secs(120)), 30);
    assert_eq!(engine.phase(), Phase::Break);
    assert!(!engine.is_running());
}

#[test]
fn start_again_after_expiry_runs_staged_phase() {
    let log: Log = Rc::default();
    let mut engine = PhaseEngine::new(TickQueue::new(), fixed(1, 1), recording_hooks(&log));
    engine.start();
    ticks(&mut engine, 60);
    engine.start();
    ticks(&mut engine, 60);

    assert_eq!(engine.phase(), Phase::Work);
    let finishes: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|s| match s {
            Seen::Finish(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(finishes, vec![Phase::Work, Phase::Break]);
}

#[test]
fn event_sink_matches_three_sinks() {
    let events = Rc::new(RefCell::new(Vec::<Event>::new()));
    let sink = Rc::clone(&events);
    let mut engine = PhaseEngine::new(
        TickQueue::new(),
        fixed(1, 1),
        TimerHooks::from_event_sink(move |e| sink.borrow_mut().push(e)),
    );
    engine.start();
    ticks(&mut engine, 60);

    let kinds: Vec<&str> = events
        .borrow()
        .iter()
        .map(|e| match e {
            Event::Finished { .. } => "finished",
            Event::RunStateChanged { .. } => "run_state",
            Event::PhaseChanged { .. } => "phase",
        })
        .collect();
    assert_eq!(kinds, vec!["run_state", "run_state", "finished", "phase"]);
}

proptest! {
    #[test]
    fn construction_stages_full_work(work in 1u32..=180, brk in 1u32..=60) {
        let engine = PhaseEngine::new(TickQueue::new(), fixed(work, brk), TimerHooks::default());
        prop_assert_eq!(engine.phase(), Phase::Work);
        prop_assert_eq!(engine.remaining_seconds(), u64::from(work) * 60);
        prop_assert!(!engine.is_running());
    }

    #[test]
    fn partial_countdown_stays_running(work in 1u32..=5, brk in 1u32..=5, frac in 0.0f64..1.0) {
        let mut engine = PhaseEngine::new(TickQueue::new(), fixed(work, brk), TimerHooks::default());
        engine.start();
        let total = engine.total_seconds();
        let n = ((total as f64) * frac) as u64;
        let n = n.min(total - 1);
        engine.advance(Duration::from_secs(n));
        prop_assert_eq!(engine.remaining_seconds(), total - n);
        prop_assert!(engine.is_running());
        prop_assert!(engine.remaining_seconds() <= engine.total_seconds());
    }

    #[test]
    fn full_countdown_stages_other_phase(work in 1u32..=3, brk in 1u32..=3, start_in_break in any::<bool>()) {
        let mut engine = PhaseEngine::new(TickQueue::new(), fixed(work, brk), TimerHooks::default());
        if start_in_break {
            engine.select_mode(Phase::Break);
        }
        let started = engine.phase();
        engine.start();
        let total = engine.total_seconds();
        engine.advance(Duration::from_secs(total));

        let expected = started.other();
        let durations = Durations { work_minutes: work, break_minutes: brk };
        prop_assert!(!engine.is_running());
        prop_assert_eq!(engine.phase(), expected);
        prop_assert_eq!(engine.selected_mode(), expected);
        prop_assert_eq!(engine.remaining_seconds(), durations.seconds(expected));
    }
}
