use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// one reminder: a daily target time paired with a message and a sound.
/// the target time is a fractional hour of day, so 17.5 is half past five
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reminder {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub target_hour: f64,
    #[serde(default = "Sound::default_name")]
    pub sound: String,
    pub message: String,
    /// exact fire time when set, otherwise jittered by up to ±15 minutes
    #[serde(default)]
    pub strict: bool,
}

impl Reminder {
    #[must_use]
    pub fn new(target_hour: f64, message: impl Into<String>, strict: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_hour,
            sound: Sound::default_name(),
            message: message.into(),
            strict,
        }
    }

    /// the three starter reminders seeded when nothing was persisted
    #[must_use]
    pub fn seed() -> Vec<Self> {
        vec![
            Self::new(8.0, "Time's up!", false),
            Self::new(12.0, "Break time!", false),
            Self::new(17.0, "End of day!", false),
        ]
    }

    pub fn apply(&mut self, edit: ReminderEdit) {
        match edit {
            ReminderEdit::Time(target_hour) => self.target_hour = target_hour,
            ReminderEdit::Message(message) => self.message = message,
            ReminderEdit::Sound(sound) => self.sound = sound,
            ReminderEdit::Strict(strict) => self.strict = strict,
        }
    }
}

/// a single-field edit to one reminder
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderEdit {
    Time(f64),
    Message(String),
    Sound(String),
    Strict(bool),
}

/// a named notification sound backed by a file in the sounds directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
}

impl Sound {
    /// the built-in chime, not backed by any file
    pub const DEFAULT: &'static str = "default";

    #[must_use]
    pub fn default_name() -> String {
        Self::DEFAULT.to_string()
    }

    fn named(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            path: Config::sounds_path().join(file),
        }
    }

    #[must_use]
    pub fn catalog() -> Vec<Self> {
        vec![
            Self::named("bell", "bell.mp3"),
            Self::named("chime", "chime.mp3"),
            Self::named("glass", "glass.mp3"),
            Self::named("horn", "horn.mp3"),
            Self::named("ping", "ping.mp3"),
        ]
    }

    /// an unknown name resolves to `None`, which plays the built-in chime
    #[must_use]
    pub fn find(name: &str) -> Option<Self> {
        Self::catalog().into_iter().find(|sound| sound.name == name)
    }
}

/// formats a fractional hour at minute resolution, 12-hour unless told otherwise
#[must_use]
pub fn format_hour(hour: f64, use_24_hour: bool) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let total_minutes = (hour * 60.0).round() as i64;
    let h = (total_minutes / 60) % 24;
    let m = total_minutes % 60;
    if use_24_hour {
        format!("{h:02}:{m:02}")
    } else {
        let period = if h >= 12 { "PM" } else { "AM" };
        let display = match h {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        format!("{display}:{m:02} {period}")
    }
}
