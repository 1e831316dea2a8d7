use clap::Subcommand;
use pomodoro_overlay_core::{ConfigError, Settings, Store};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting value
    Get {
        /// Setting key (e.g. "work_minutes", "theme")
        key: String,
    },
    /// Set a setting value
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
    /// Set both interval lengths at once, in minutes
    Durations {
        /// Work interval
        work: String,
        /// Break interval
        #[arg(value_name = "BREAK")]
        break_minutes: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
    /// Print the data directory
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    match action {
        ConfigAction::Get { key } => {
            let settings = store.load_settings()?;
            let value = settings
                .get(&key)
                .ok_or_else(|| ConfigError::UnknownKey(key.clone()))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut settings = store.load_settings()?;
            settings.set(&key, &value)?;
            store.save_settings(&settings)?;
            println!("ok");
        }
        ConfigAction::Durations {
            work,
            break_minutes,
        } => {
            let mut settings = store.load_settings()?;
            settings.apply_durations(&work, &break_minutes)?;
            store.save_settings(&settings)?;
            println!(
                "work {} min, break {} min",
                settings.work_minutes, settings.break_minutes
            );
        }
        ConfigAction::List => {
            let settings = store.load_settings()?;
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.save_settings(&Settings::default())?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", store.dir().display());
        }
    }
    Ok(())
}
