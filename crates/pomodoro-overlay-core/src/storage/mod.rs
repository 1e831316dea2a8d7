mod config;

pub use config::{Settings, MAX_ALPHA, MIN_ALPHA};

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ConfigError, CoreError};
use crate::task::TaskList;

pub const CONFIG_FILENAME: &str = "config.json";
pub const TASKS_FILENAME: &str = "tasks.txt";

/// Returns the overlay data directory.
///
/// `POMODORO_OVERLAY_DIR` overrides the location outright. Otherwise it is
/// `<config dir>/pomodoro-overlay[-dev]`, with the `-dev` suffix selected by
/// `POMODORO_OVERLAY_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("POMODORO_OVERLAY_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            let env = std::env::var("POMODORO_OVERLAY_ENV")
                .unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomodoro-overlay-dev")
            } else {
                base_dir.join("pomodoro-overlay")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Settings and task list persisted side by side in one directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at [`data_dir`].
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::new(data_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILENAME)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join(TASKS_FILENAME)
    }

    /// Load settings, writing defaults first if the file does not exist.
    ///
    /// An unreadable or malformed file is logged and replaced by defaults in
    /// memory; the file on disk is left alone.
    pub fn load_settings(&self) -> Result<Settings, CoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.config_path();
        if !path.exists() {
            let defaults = Settings::default();
            self.save_settings(&defaults)?;
            return Ok(defaults);
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<serde_json::Value>(&content).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(value) => Ok(Settings::from_json_lenient(&value)),
            Err(message) => {
                warn!(path = %path.display(), %message, "unreadable settings, using defaults");
                Ok(Settings::default())
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        let path = self.config_path();
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, content))
            .map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Load the task list; a missing or unreadable file is an empty list.
    pub fn load_tasks(&self) -> TaskList {
        let path = self.tasks_path();
        match std::fs::read_to_string(&path) {
            Ok(text) => TaskList::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TaskList::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable task list, starting empty");
                TaskList::default()
            }
        }
    }

    pub fn save_tasks(&self, tasks: &TaskList) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.tasks_path(), tasks.to_text())?;
        Ok(())
    }

    /// Load both files, dropping an `active_task_index` that points past the
    /// end of the task list.
    pub fn load(&self) -> Result<(Settings, TaskList), CoreError> {
        let mut settings = self.load_settings()?;
        let tasks = self.load_tasks();
        settings.active_task_index = settings
            .active_task_index
            .filter(|&i| i < tasks.len());
        Ok((settings, tasks))
    }

    /// Persist both files, recomputing the active task from the list.
    pub fn save(&self, settings: &mut Settings, tasks: &TaskList) -> Result<(), CoreError> {
        settings.active_task_index = tasks.first_active_index();
        self.save_settings(settings)?;
        self.save_tasks(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let settings = store.load_settings().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(store.config_path().exists());
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(store.config_path(), "{ not json").unwrap();
        assert_eq!(store.load_settings().unwrap(), Settings::default());
        assert_eq!(
            std::fs::read_to_string(store.config_path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let mut settings = Settings {
            theme: Theme::Dark,
            work_minutes: 50,
            ..Settings::default()
        };
        let tasks = TaskList::parse("+ first\nsecond");
        store.save(&mut settings, &tasks).unwrap();
        assert_eq!(settings.active_task_index, Some(1));

        let (loaded, loaded_tasks) = store.load().unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded_tasks, tasks);
    }

    #[test]
    fn stale_active_index_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(store.config_path(), r#"{"active_task_index": 7}"#).unwrap();
        std::fs::write(store.tasks_path(), "only one").unwrap();
        let (settings, _) = store.load().unwrap();
        assert_eq!(settings.active_task_index, None);
    }

    #[test]
    fn missing_tasks_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Store::new(dir.path()).load_tasks().is_empty());
    }
}
