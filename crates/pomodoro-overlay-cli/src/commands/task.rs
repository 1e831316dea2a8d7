//! Task list commands for CLI.

use clap::Subcommand;
use pomodoro_overlay_core::{Store, TaskList, ValidationError};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks with 1-based numbers
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark a task done
    Done {
        /// Task number as shown by `task list`
        number: usize,
    },
    /// Mark a task not done
    Undo {
        /// Task number as shown by `task list`
        number: usize,
    },
    /// Remove finished tasks
    Clear,
    /// Print the active task (first unfinished, non-blank)
    Active,
    /// Replace the whole list with text read from stdin
    Import,
}

fn to_index(tasks: &TaskList, number: usize) -> Result<usize, ValidationError> {
    number
        .checked_sub(1)
        .filter(|&i| i < tasks.len())
        .ok_or(ValidationError::OutOfBounds {
            collection: "tasks".into(),
            index: number,
            len: tasks.len(),
        })
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let (mut settings, mut tasks) = store.load()?;

    match action {
        TaskAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(tasks.tasks())?);
            } else {
                for (i, task) in tasks.tasks().iter().enumerate() {
                    let mark = if task.done { "x" } else { " " };
                    println!("{:>3}. [{mark}] {}", i + 1, task.text);
                }
                println!("progress: {}", tasks.progress());
            }
            return Ok(());
        }
        TaskAction::Add { text } => {
            tasks.push(text.join(" "));
            println!("added task {}", tasks.len());
        }
        TaskAction::Done { number } => {
            tasks.set_done(to_index(&tasks, number)?, true)?;
            println!("progress: {}", tasks.progress());
        }
        TaskAction::Undo { number } => {
            tasks.set_done(to_index(&tasks, number)?, false)?;
            println!("progress: {}", tasks.progress());
        }
        TaskAction::Clear => {
            let removed = tasks.clear_done();
            println!("removed {removed} finished task(s)");
        }
        TaskAction::Active => {
            println!("{}", tasks.active_text());
            return Ok(());
        }
        TaskAction::Import => {
            let text = std::io::read_to_string(std::io::stdin())?;
            tasks = TaskList::parse(&text);
            println!("imported {} task(s)", tasks.len());
        }
    }

    store.save(&mut settings, &tasks)?;
    Ok(())
}
