//! Interactive terminal host for the phase engine.
//!
//! Reads one intent per line from stdin, delivers due ticks from a monotonic
//! clock, and redraws the countdown line after every change.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Args;
use pomodoro_overlay_core::theme::{ansi_fg, ANSI_RESET};
use pomodoro_overlay_core::timer::progress_bar;
use pomodoro_overlay_core::{
    Durations, Event, Palette, Phase, PhaseEngine, Store, TickQueue, TimerHooks,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const BAR_WIDTH: usize = 24;

#[derive(Args)]
pub struct RunArgs {
    /// Start counting down immediately
    #[arg(long)]
    pub start: bool,
    /// Disable colours and the terminal bell
    #[arg(long)]
    pub plain: bool,
}

/// User intents forwarded into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Toggle,
    Reset,
    Select(Phase),
    Help,
    Quit,
}

impl Intent {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "" | "s" | "space" | "start" | "pause" => Some(Intent::Toggle),
            "r" | "reset" => Some(Intent::Reset),
            "w" | "work" | "pomodoro" => Some(Intent::Select(Phase::Work)),
            "b" | "break" => Some(Intent::Select(Phase::Break)),
            "h" | "?" | "help" => Some(Intent::Help),
            "q" | "quit" | "exit" => Some(Intent::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "keys: <enter>/s start-pause, r reset, w work, b break, q quit";

/// What the host shows above the countdown: the break label or the active task.
struct HostView {
    store: Store,
    header: String,
    palette: Palette,
    plain: bool,
}

impl HostView {
    fn on_phase_changed(&mut self, phase: Phase) {
        self.header = match phase {
            Phase::Break => Phase::Break.label().to_string(),
            Phase::Work => self.store.load_tasks().active_text().to_string(),
        };
    }

    fn notify_finished(&self, phase: Phase) {
        println!();
        println!("{} finished", phase.label());
        if !self.plain {
            print!("\x07");
        }
    }

    fn paint(&self, text: &str, colour: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            format!("{}{text}{ANSI_RESET}", ansi_fg(colour))
        }
    }

    fn render<C>(&self, engine: &PhaseEngine<TickQueue, C>)
    where
        C: Fn() -> Durations,
    {
        let snap = engine.snapshot();
        let state = if snap.running { "running" } else { "paused" };
        let line = format!(
            "[{}] {} {} {} {}",
            snap.phase.label(),
            self.paint(&snap.display, self.palette.fg),
            self.paint(&progress_bar(snap.remaining_fraction, BAR_WIDTH), self.palette.progress_fg),
            self.paint(state, self.palette.fg_dim),
            self.header,
        );
        print!("\r\x1b[2K{line}");
        let _ = std::io::stdout().flush();
    }
}

async fn sleep_or_forever(wait: Option<Duration>) {
    match wait {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending::<()>().await,
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let (settings, _) = store.load()?;

    let mut view = HostView {
        store: store.clone(),
        header: String::new(),
        palette: settings.theme.palette(),
        plain: args.plain,
    };
    let events: Rc<RefCell<Vec<Event>>> = Rc::default();
    let sink = Rc::clone(&events);

    let source_store = store.clone();
    let source = move || match source_store.load_settings() {
        Ok(settings) => settings.durations(),
        Err(e) => {
            warn!(error = %e, "cannot read settings, using default durations");
            Durations::default()
        }
    };
    let mut engine = PhaseEngine::new(
        TickQueue::new(),
        source,
        TimerHooks::from_event_sink(move |e| sink.borrow_mut().push(e)),
    );
    view.on_phase_changed(engine.phase());

    let origin = Instant::now();
    if args.start {
        engine.start();
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        drain_events(&events, &mut view);
        view.render(&engine);

        let wait = engine.scheduler().until_next();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                engine.advance_to(origin.elapsed());
                match Intent::parse(&line) {
                    Some(Intent::Quit) => break,
                    Some(Intent::Toggle) => engine.toggle(),
                    Some(Intent::Reset) => engine.reset(),
                    Some(Intent::Select(phase)) => engine.select_mode(phase),
                    Some(Intent::Help) => println!("\n{HELP}"),
                    None => {
                        debug!(%line, "unrecognised input");
                        println!("\n{HELP}");
                    }
                }
            }
            _ = sleep_or_forever(wait) => {
                engine.advance_to(origin.elapsed());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drain_events(&events, &mut view);
    println!();
    Ok(())
}

fn drain_events(events: &RefCell<Vec<Event>>, view: &mut HostView) {
    for event in events.borrow_mut().drain(..) {
        match event {
            Event::Finished { phase, .. } => view.notify_finished(phase),
            Event::PhaseChanged { phase, .. } => view.on_phase_changed(phase),
            Event::RunStateChanged { running, .. } => debug!(running, "run state changed"),
        }
    }
}

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let (settings, tasks) = store.load()?;
    let engine = PhaseEngine::new(
        TickQueue::new(),
        move || settings.durations(),
        TimerHooks::default(),
    );
    let report = serde_json::json!({
        "timer": engine.snapshot(),
        "active_task": tasks.active_text(),
        "tasks": tasks.progress().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_intents() {
        assert_eq!(Intent::parse(" "), Some(Intent::Toggle));
        assert_eq!(Intent::parse("S"), Some(Intent::Toggle));
        assert_eq!(Intent::parse("r"), Some(Intent::Reset));
        assert_eq!(Intent::parse("break"), Some(Intent::Select(Phase::Break)));
        assert_eq!(Intent::parse("w"), Some(Intent::Select(Phase::Work)));
        assert_eq!(Intent::parse("q"), Some(Intent::Quit));
        assert_eq!(Intent::parse("xyz"), None);
    }
}
