use std::{fmt, time::Duration};

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    notifier::Trigger,
    reminder::{Reminder, Sound},
};

/// jitter bound for loose reminders, in seconds either side of the target
pub const JITTER_SECONDS: f64 = 900.0;
/// how long the host holds a replacement trigger so the cancel settles first
pub const SETTLE: Duration = Duration::from_millis(100);
/// longer settle after a cancel-all sweep
pub const BULK_SETTLE: Duration = Duration::from_secs(1);

/// a concrete hour/minute a trigger fires at, recomputed on every (re)schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireTime {
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for FireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// strict reminders fire exactly on target; loose ones get a fresh uniform
/// offset in [-15, +15] minutes each time, wrapped into the 24 hour day
pub fn fire_time(reminder: &Reminder, rng: &mut impl Rng) -> FireTime {
    let offset = if reminder.strict {
        0.0
    } else {
        rng.gen_range(-JITTER_SECONDS..=JITTER_SECONDS)
    };
    #[allow(clippy::cast_possible_truncation)]
    let total_minutes =
        (((reminder.target_hour * 3600.0 + offset) / 60.0) as i64).rem_euclid(24 * 60);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fire = FireTime {
        hour: (total_minutes / 60) as u8,
        minute: (total_minutes % 60) as u8,
    };
    fire
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("notification host is gone")]
    Disconnected,
}

/// the host notification service the scheduler registers triggers with.
/// requests are fire-and-forget; nothing here blocks on host-side confirmation
pub trait NotificationHost {
    fn register(&self, trigger: Trigger, settle: Duration) -> Result<(), HostError>;
    fn cancel(&self, id: Uuid) -> Result<(), HostError>;
    fn cancel_all(&self) -> Result<(), HostError>;
    fn pending(&self) -> Vec<Uuid>;
}

/// translates reminders into recurring daily triggers keyed by reminder id
pub struct Scheduler {
    host: Box<dyn NotificationHost>,
}

impl Scheduler {
    #[must_use]
    pub fn new(host: Box<dyn NotificationHost>) -> Self {
        Self { host }
    }

    /// cancels any trigger under the reminder's id, then registers the
    /// replacement. a registration failure is logged and the reminder stays
    /// unscheduled until the next edit or bulk reschedule
    pub fn schedule(&self, reminder: &Reminder) {
        self.schedule_with(reminder, &mut rand::thread_rng(), SETTLE);
    }

    fn schedule_with(&self, reminder: &Reminder, rng: &mut impl Rng, settle: Duration) {
        if let Err(err) = self.host.cancel(reminder.id) {
            log::error!("couldn't cancel trigger for {}: {err}", reminder.id);
        }
        let fire = fire_time(reminder, rng);
        log::info!(
            "scheduling reminder {} at {fire} (target hour {}, {})",
            reminder.id,
            reminder.target_hour,
            if reminder.strict { "exact" } else { "loose" }
        );
        let trigger = Trigger {
            id: reminder.id,
            fire,
            message: reminder.message.clone(),
            sound: Sound::find(&reminder.sound).map(|sound| sound.path),
        };
        if let Err(err) = self.host.register(trigger, settle) {
            log::error!("couldn't register trigger for {}: {err}", reminder.id);
        }
    }

    pub fn cancel(&self, id: Uuid) {
        if let Err(err) = self.host.cancel(id) {
            log::error!("couldn't cancel trigger for {id}: {err}");
        }
    }

    /// cancels every pending trigger, then re-registers one per reminder
    pub fn reschedule_all(&self, reminders: &[Reminder]) {
        log::info!("rescheduling all {} reminders", reminders.len());
        if let Err(err) = self.host.cancel_all() {
            log::error!("couldn't cancel pending triggers: {err}");
        }
        let mut rng = rand::thread_rng();
        for reminder in reminders {
            self.schedule_with(reminder, &mut rng, BULK_SETTLE);
        }
    }

    #[must_use]
    pub fn pending(&self) -> Vec<Uuid> {
        self.host.pending()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum HostOp {
        Register(Trigger),
        Cancel(Uuid),
        CancelAll,
    }

    /// records every request so tests can assert on ordering and the
    /// resulting pending set
    #[derive(Default, Clone)]
    pub struct RecordingHost {
        pub ops: Arc<Mutex<Vec<HostOp>>>,
    }

    impl RecordingHost {
        pub fn ops(&self) -> Vec<HostOp> {
            self.ops.lock().unwrap().clone()
        }

        pub fn registered(&self) -> Vec<Trigger> {
            self.ops()
                .into_iter()
                .filter_map(|op| match op {
                    HostOp::Register(trigger) => Some(trigger),
                    _ => None,
                })
                .collect()
        }
    }

    impl NotificationHost for RecordingHost {
        fn register(&self, trigger: Trigger, _settle: Duration) -> Result<(), HostError> {
            self.ops.lock().unwrap().push(HostOp::Register(trigger));
            Ok(())
        }

        fn cancel(&self, id: Uuid) -> Result<(), HostError> {
            self.ops.lock().unwrap().push(HostOp::Cancel(id));
            Ok(())
        }

        fn cancel_all(&self) -> Result<(), HostError> {
            self.ops.lock().unwrap().push(HostOp::CancelAll);
            Ok(())
        }

        fn pending(&self) -> Vec<Uuid> {
            let mut pending = Vec::new();
            for op in self.ops() {
                match op {
                    HostOp::Register(trigger) => {
                        if !pending.contains(&trigger.id) {
                            pending.push(trigger.id);
                        }
                    }
                    HostOp::Cancel(id) => pending.retain(|p| *p != id),
                    HostOp::CancelAll => pending.clear(),
                }
            }
            pending
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::{testing::{HostOp, RecordingHost}, *};

    /// minutes between two fire times on the 24 hour circle
    fn circular_distance(a: i64, b: i64) -> i64 {
        let diff = (a - b).rem_euclid(24 * 60);
        diff.min(24 * 60 - diff)
    }

    fn minutes(fire: FireTime) -> i64 {
        i64::from(fire.hour) * 60 + i64::from(fire.minute)
    }

    #[test]
    fn strict_fire_time_is_exact_every_time() {
        let reminder = Reminder::new(17.5, "tea", true);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let fire = fire_time(&reminder, &mut rng);
            assert_eq!((fire.hour, fire.minute), (17, 30));
        }
    }

    #[test]
    fn loose_fire_time_stays_within_fifteen_minutes() {
        let reminder = Reminder::new(8.0, "Time's up!", false);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let fire = fire_time(&reminder, &mut rng);
            // [07:45, 08:15]
            assert!(
                (7 * 60 + 45..=8 * 60 + 15).contains(&minutes(fire)),
                "fire time {fire} outside the jitter window"
            );
        }
    }

    #[test]
    fn loose_fire_time_varies_between_reschedules() {
        let reminder = Reminder::new(8.0, "Time's up!", false);
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            seen.insert(minutes(fire_time(&reminder, &mut rng)));
        }
        assert!(seen.len() > 1, "jitter never varied");
    }

    #[test]
    fn loose_fire_time_wraps_around_midnight() {
        let mut rng = StdRng::seed_from_u64(9);
        for target in [0.1, 23.9] {
            let reminder = Reminder::new(target, "late", false);
            #[allow(clippy::cast_possible_truncation)]
            let target_minutes = (target * 60.0) as i64;
            for _ in 0..100 {
                let fire = fire_time(&reminder, &mut rng);
                assert!(fire.hour < 24 && fire.minute < 60);
                assert!(circular_distance(minutes(fire), target_minutes) <= 15);
            }
        }
    }

    #[test]
    fn schedule_cancels_before_registering() {
        let host = RecordingHost::default();
        let scheduler = Scheduler::new(Box::new(host.clone()));
        let reminder = Reminder::new(12.0, "lunch", true);
        scheduler.schedule(&reminder);
        let ops = host.ops();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], HostOp::Cancel(reminder.id));
        assert!(matches!(&ops[1], HostOp::Register(trigger) if trigger.id == reminder.id));
    }

    #[test]
    fn reschedule_all_registers_one_trigger_per_reminder() {
        let host = RecordingHost::default();
        let scheduler = Scheduler::new(Box::new(host.clone()));
        let reminders = Reminder::seed();
        scheduler.reschedule_all(&reminders);
        assert_eq!(host.ops()[0], HostOp::CancelAll);
        let pending = scheduler.pending();
        assert_eq!(pending.len(), reminders.len());
        for reminder in &reminders {
            assert!(pending.contains(&reminder.id));
        }
    }
}
