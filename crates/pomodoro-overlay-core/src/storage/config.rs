//! JSON-based overlay settings.
//!
//! Stores user preferences including:
//! - Window transparency (`alpha`)
//! - Work and break interval lengths
//! - Light/dark theme
//! - Index of the active task
//!
//! Settings are stored as `config.json` in the data directory; the task
//! list lives beside it in `tasks.txt` (see [`super::Store`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, CoreError, ValidationError};
use crate::theme::Theme;
use crate::timer::Durations;

pub const MIN_ALPHA: f64 = 0.3;
pub const MAX_ALPHA: f64 = 1.0;

/// Settings that may be cleared back to `null`.
const NULLABLE_KEYS: &[&str] = &["active_task_index"];

fn default_alpha() -> f64 {
    0.85
}
fn default_work_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}

/// Overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub active_task_index: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            theme: Theme::default(),
            active_task_index: None,
        }
    }
}

impl Settings {
    /// Build settings from arbitrary JSON, clamping every field into range.
    ///
    /// Missing or mistyped fields take their defaults; this never fails so a
    /// hand-edited file cannot lock the user out.
    pub fn from_json_lenient(value: &Value) -> Self {
        let defaults = Self::default();
        let alpha = value
            .get("alpha")
            .and_then(lenient_f64)
            .unwrap_or(defaults.alpha);
        let minutes = |key: &str, fallback: u32| -> u32 {
            value
                .get(key)
                .and_then(lenient_i64)
                .map(|m| m.clamp(1, i64::from(u32::MAX)) as u32)
                .unwrap_or(fallback)
        };
        let theme = value
            .get("theme")
            .and_then(Value::as_str)
            .map(Theme::from_name)
            .unwrap_or_default();
        let active_task_index = value
            .get("active_task_index")
            .and_then(Value::as_u64)
            .map(|i| i as usize);

        Self {
            alpha,
            work_minutes: minutes("work_minutes", defaults.work_minutes),
            break_minutes: minutes("break_minutes", defaults.break_minutes),
            theme,
            active_task_index,
        }
        .normalized()
    }

    /// Clamp alpha into [0.3, 1.0] and interval lengths to at least a minute.
    pub fn normalized(mut self) -> Self {
        self.alpha = if self.alpha.is_finite() {
            self.alpha.clamp(MIN_ALPHA, MAX_ALPHA)
        } else {
            default_alpha()
        };
        self.work_minutes = self.work_minutes.max(1);
        self.break_minutes = self.break_minutes.max(1);
        self
    }

    /// Snapshot handed to the phase engine.
    pub fn durations(&self) -> Durations {
        Durations {
            work_minutes: self.work_minutes,
            break_minutes: self.break_minutes,
        }
    }

    /// Apply interval lengths typed into the settings form.
    ///
    /// Both values must parse as integers >= 1; otherwise nothing changes.
    pub fn apply_durations(
        &mut self,
        work_text: &str,
        break_text: &str,
    ) -> Result<(), ValidationError> {
        let work = parse_minutes("work_minutes", work_text)?;
        let brk = parse_minutes("break_minutes", break_text)?;
        self.work_minutes = work;
        self.break_minutes = brk;
        Ok(())
    }

    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<(), CoreError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                let nullable = existing.is_null() || NULLABLE_KEYS.contains(&key);

                let new_value = match existing {
                    // Optional fields take a number or "none", whatever they hold now.
                    _ if nullable => match value.trim() {
                        "" | "none" | "null" => Value::Null,
                        other => parse_number(other).ok_or_else(|| {
                            invalid(format!("cannot parse '{value}' as number"))
                        })?,
                    },
                    Value::Bool(_) => Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    Value::Number(_) => parse_number(value).ok_or_else(|| {
                        invalid(format!("cannot parse '{value}' as number"))
                    })?,
                    Value::Null => Value::Null,
                    Value::Object(_) | Value::Array(_) => serde_json::from_str(value)?,
                    Value::String(_) => Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown().into())
    }

    /// Get a setting as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a setting by key, re-normalizing afterwards. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Settings = serde_json::from_value(json).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        *self = updated.normalized();
        Ok(())
    }
}

/// Numbers in hand-edited files may arrive as JSON strings.
fn lenient_f64(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn lenient_i64(v: &Value) -> Option<i64> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        other => other.as_i64().or_else(|| other.as_f64().map(|f| f as i64)),
    }
}

fn parse_number(value: &str) -> Option<Value> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        Some(Value::Number(n.into()))
    } else if let Ok(n) = value.parse::<i64>() {
        Some(Value::Number(n.into()))
    } else {
        value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    }
}

fn parse_minutes(field: &str, text: &str) -> Result<u32, ValidationError> {
    match text.trim().parse::<u32>() {
        Ok(m) if m >= 1 => Ok(m),
        _ => Err(ValidationError::InvalidMinutes {
            field: field.to_string(),
            value: text.to_string(),
        }),
    }
}
