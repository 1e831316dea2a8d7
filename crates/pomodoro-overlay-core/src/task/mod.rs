//! Free-text task list.
//!
//! The list is edited as plain text: one task per line, and a line whose
//! first non-blank character is `+` marks a finished task. Parsing happens
//! only when the text is saved or loaded, so the editor never has to keep
//! structured state in sync while the user types.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const DONE_MARKER: char = '+';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }

    /// Not done and has visible text.
    pub fn is_active(&self) -> bool {
        !self.done && !self.text.trim().is_empty()
    }
}

/// Completed vs. total counts for the task progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub done: usize,
    pub total: usize,
}

impl TaskProgress {
    /// 0.0 .. 100.0; an empty list reports 0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.done as f64 / self.total as f64
    }
}

impl std::fmt::Display for TaskProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.done, self.total)
    }
}

/// Ordered task list with the text round-trip used by `tasks.txt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Parse editor text. Every line becomes a task, blank lines included.
    pub fn parse(text: &str) -> Self {
        let tasks = text
            .lines()
            .map(|line| {
                if line.trim_start().starts_with(DONE_MARKER) {
                    let rest = line.trim_start_matches([DONE_MARKER, ' ', '\t']);
                    Task {
                        text: rest.to_string(),
                        done: true,
                    }
                } else {
                    Task::new(line)
                }
            })
            .collect();
        Self { tasks }
    }

    /// Render back to editor text; done tasks get a `+ ` prefix.
    pub fn to_text(&self) -> String {
        self.tasks
            .iter()
            .map(|t| {
                if t.done {
                    format!("{DONE_MARKER} {}", t.text)
                } else {
                    t.text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Index of the first task that is not done and not blank.
    pub fn first_active_index(&self) -> Option<usize> {
        self.tasks.iter().position(Task::is_active)
    }

    /// Text shown next to the timer; empty when nothing is active.
    pub fn active_text(&self) -> &str {
        self.first_active_index()
            .map(|i| self.tasks[i].text.as_str())
            .unwrap_or("")
    }

    pub fn progress(&self) -> TaskProgress {
        TaskProgress {
            done: self.tasks.iter().filter(|t| t.done).count(),
            total: self.tasks.len(),
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.tasks.push(Task::new(text));
    }

    /// Mark the task at `index` done or not done.
    pub fn set_done(&mut self, index: usize, done: bool) -> Result<(), ValidationError> {
        let len = self.tasks.len();
        let task = self
            .tasks
            .get_mut(index)
            .ok_or_else(|| ValidationError::OutOfBounds {
                collection: "tasks".into(),
                index,
                len,
            })?;
        task.done = done;
        Ok(())
    }

    /// Drop finished tasks, keeping the order of the rest.
    pub fn clear_done(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.done);
        before - self.tasks.len()
    }
}
