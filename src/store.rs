use std::path::PathBuf;

use uuid::Uuid;

use crate::{
    config::Config,
    reminder::{Reminder, ReminderEdit},
    scheduler::Scheduler,
};

/// owns the reminder list and the persisted settings. every mutation writes
/// the whole config back out and keeps the host's trigger set in step with
/// the one affected reminder
pub struct ReminderStore {
    config: Config,
    path: PathBuf,
    scheduler: Scheduler,
}

impl ReminderStore {
    /// loads the persisted state (defaults on a missing or corrupt file),
    /// seeds the starter reminders on first launch and registers a trigger
    /// for every entry
    #[must_use]
    pub fn load(path: PathBuf, scheduler: Scheduler) -> Self {
        let mut config = Config::load(&path);
        let seeded = config.reminders.is_empty();
        if seeded {
            config.reminders = Reminder::seed();
        }
        let store = Self {
            config,
            path,
            scheduler,
        };
        if seeded {
            store.persist();
        }
        for reminder in &store.config.reminders {
            store.scheduler.schedule(reminder);
        }
        store
    }

    #[must_use]
    pub fn reminders(&self) -> &[Reminder] {
        &self.config.reminders
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// appends a reminder with the defaults (noon, preset message, the
    /// settings' starting strictness) and schedules it
    pub fn add(&mut self) -> Uuid {
        let reminder = Reminder::new(12.0, "New reminder!", self.config.strict_default);
        let id = reminder.id;
        log::info!("adding reminder {id}");
        self.scheduler.schedule(&reminder);
        self.config.reminders.push(reminder);
        self.persist();
        id
    }

    /// edits one field of one reminder, then cancels and reschedules only
    /// that reminder's trigger. unknown ids are ignored
    pub fn edit(&mut self, id: Uuid, edit: ReminderEdit) {
        let Some(reminder) = self.config.reminders.iter_mut().find(|r| r.id == id) else {
            log::debug!("edit for unknown reminder {id}");
            return;
        };
        reminder.apply(edit);
        let reminder = reminder.clone();
        self.persist();
        self.scheduler.schedule(&reminder);
    }

    pub fn delete(&mut self, id: Uuid) {
        log::info!("deleting reminder {id}");
        self.scheduler.cancel(id);
        self.config.reminders.retain(|reminder| reminder.id != id);
        self.persist();
    }

    /// explicit bulk operation: drop every pending trigger and re-register
    /// one per current reminder
    pub fn reschedule_all(&self) {
        self.scheduler.reschedule_all(&self.config.reminders);
    }

    #[must_use]
    pub fn pending(&self) -> Vec<Uuid> {
        self.scheduler.pending()
    }

    pub fn set_use_24_hour(&mut self, on: bool) {
        self.config.use_24_hour = on;
        self.persist();
    }

    pub fn set_strict_default(&mut self, on: bool) {
        self.config.strict_default = on;
        self.persist();
    }

    pub fn set_background_color(&mut self, color: [f32; 3]) {
        self.config.background_color = color;
        self.persist();
    }

    pub fn set_text_color(&mut self, color: [f32; 3]) {
        self.config.text_color = color;
        self.persist();
    }

    /// copies the picked image into the data directory so the config never
    /// points at a file the user might move; `None` clears it again
    pub fn set_background_image(&mut self, picked: Option<PathBuf>) {
        if let Some(old) = self.config.background_image.take() {
            // only remove copies we made ourselves
            if old.starts_with(Config::data_path()) {
                if let Err(err) = std::fs::remove_file(&old) {
                    log::debug!("couldn't remove old background {}: {err}", old.display());
                }
            }
        }
        if let Some(source) = picked {
            match copy_background(&source) {
                Ok(dest) => self.config.background_image = Some(dest),
                Err(err) => {
                    log::error!("couldn't copy background image {}: {err}", source.display());
                }
            }
        }
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.config.save(&self.path) {
            log::error!("couldn't persist config to {}: {err}", self.path.display());
        }
    }
}

fn copy_background(source: &std::path::Path) -> std::io::Result<PathBuf> {
    let extension = source.extension().map_or_else(|| "img".into(), |e| e.to_os_string());
    let mut dest = Config::data_path().join("background");
    dest.set_extension(extension);
    std::fs::create_dir_all(Config::data_path())?;
    std::fs::copy(source, &dest)?;
    Ok(dest)
}
