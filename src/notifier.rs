use std::{
    collections::{HashMap, HashSet},
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use rodio::{source::SineWave, Decoder, OutputStream, OutputStreamHandle, Source};
use uuid::Uuid;

use crate::scheduler::{FireTime, HostError, NotificationHost};

/// one recurring daily trigger as the notifier sees it.
/// title stays empty by design, only the message is shown
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub id: Uuid,
    pub fire: FireTime,
    pub message: String,
    /// resolved sound file; `None` plays the built-in chime
    pub sound: Option<PathBuf>,
}

#[derive(Debug)]
enum HostRequest {
    Register { trigger: Trigger, settle: Duration },
    Cancel(Uuid),
    CancelAll,
}

/// sent back to the gui when a trigger fires
#[derive(Debug, Clone)]
pub struct Fired {
    pub id: Uuid,
    pub message: String,
}

/// handle to the notifier thread. cheap to clone; all requests are
/// fire-and-forget over the channel
#[derive(Clone)]
pub struct ChannelHost {
    sender: Sender<HostRequest>,
    pending: Arc<Mutex<HashSet<Uuid>>>,
}

impl NotificationHost for ChannelHost {
    fn register(&self, trigger: Trigger, settle: Duration) -> Result<(), HostError> {
        self.sender
            .send(HostRequest::Register { trigger, settle })
            .map_err(|_| HostError::Disconnected)
    }

    fn cancel(&self, id: Uuid) -> Result<(), HostError> {
        self.sender
            .send(HostRequest::Cancel(id))
            .map_err(|_| HostError::Disconnected)
    }

    fn cancel_all(&self) -> Result<(), HostError> {
        self.sender
            .send(HostRequest::CancelAll)
            .map_err(|_| HostError::Disconnected)
    }

    fn pending(&self) -> Vec<Uuid> {
        self.pending
            .lock()
            .map(|pending| pending.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// spawns the notifier thread, returning the host handle and the receiver
/// for fired-trigger events
#[must_use]
pub fn spawn() -> (ChannelHost, Receiver<Fired>) {
    let (sender, requests) = mpsc::channel();
    let (fired_sender, fired) = mpsc::channel();
    let pending = Arc::new(Mutex::new(HashSet::new()));
    let mirror = Arc::clone(&pending);
    thread::spawn(move || run(&requests, &fired_sender, &mirror));
    (ChannelHost { sender, pending }, fired)
}

const TICK: Duration = Duration::from_millis(250);

struct PendingTrigger {
    trigger: Trigger,
    last_fired: Option<NaiveDate>,
}

fn run(requests: &Receiver<HostRequest>, fired: &Sender<Fired>, mirror: &Mutex<HashSet<Uuid>>) {
    // the stream half has to stay alive for playback to keep working
    let audio = match OutputStream::try_default() {
        Ok(audio) => Some(audio),
        Err(err) => {
            log::warn!("no audio output available: {err}");
            None
        }
    };
    let mut pending: HashMap<Uuid, PendingTrigger> = HashMap::new();
    // registrations wait out their settle delay here before going pending
    let mut settling: Vec<(Instant, Trigger)> = Vec::new();
    loop {
        match requests.recv_timeout(TICK) {
            Ok(HostRequest::Register { trigger, settle }) => {
                settling.push((Instant::now() + settle, trigger));
            }
            Ok(HostRequest::Cancel(id)) => {
                settling.retain(|(_, trigger)| trigger.id != id);
                pending.remove(&id);
            }
            Ok(HostRequest::CancelAll) => {
                settling.clear();
                pending.clear();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        let mut i = 0;
        while i < settling.len() {
            if settling[i].0 <= now {
                let (_, trigger) = settling.remove(i);
                pending.insert(
                    trigger.id,
                    PendingTrigger {
                        trigger,
                        last_fired: None,
                    },
                );
            } else {
                i += 1;
            }
        }
        sync_mirror(mirror, &pending, &settling);

        let now_local = Local::now();
        let today = now_local.date_naive();
        let now_time = now_local.time();
        for entry in pending.values_mut() {
            if entry.last_fired == Some(today) || !due(entry.trigger.fire, now_time) {
                continue;
            }
            entry.last_fired = Some(today);
            log::info!("reminder {} fired: {}", entry.trigger.id, entry.trigger.message);
            play(audio.as_ref().map(|(_, handle)| handle), entry.trigger.sound.as_deref());
            if fired
                .send(Fired {
                    id: entry.trigger.id,
                    message: entry.trigger.message.clone(),
                })
                .is_err()
            {
                log::debug!("gui is gone, dropping fired event");
            }
        }
    }
}

fn sync_mirror(
    mirror: &Mutex<HashSet<Uuid>>,
    pending: &HashMap<Uuid, PendingTrigger>,
    settling: &[(Instant, Trigger)],
) {
    if let Ok(mut ids) = mirror.lock() {
        ids.clear();
        ids.extend(pending.keys().copied());
        ids.extend(settling.iter().map(|(_, trigger)| trigger.id));
    }
}

/// a trigger is due for the first minute after its fire time
fn due(fire: FireTime, now: NaiveTime) -> bool {
    let fire_seconds = i64::from(fire.hour) * 3600 + i64::from(fire.minute) * 60;
    let now_seconds = i64::from(now.num_seconds_from_midnight());
    (0..60).contains(&(now_seconds - fire_seconds))
}

fn play(handle: Option<&OutputStreamHandle>, sound: Option<&Path>) {
    let Some(handle) = handle else { return };
    let Some(path) = sound else {
        chime(handle);
        return;
    };
    match std::fs::File::open(path) {
        Ok(file) => match Decoder::new(BufReader::new(file)) {
            Ok(source) => {
                if let Err(err) = handle.play_raw(source.convert_samples()) {
                    log::warn!("couldn't play {}: {err}", path.display());
                }
            }
            Err(err) => {
                log::warn!("couldn't decode {}: {err}", path.display());
                chime(handle);
            }
        },
        Err(err) => {
            log::warn!("couldn't open sound file {}: {err}", path.display());
            chime(handle);
        }
    }
}

fn chime(handle: &OutputStreamHandle) {
    let source = SineWave::new(880.0)
        .take_duration(Duration::from_millis(600))
        .amplify(0.25);
    if let Err(err) = handle.play_raw(source) {
        log::warn!("couldn't play the default chime: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, second).unwrap()
    }

    #[test]
    fn due_only_within_the_first_minute() {
        let fire = FireTime { hour: 8, minute: 15 };
        assert!(!due(fire, at(8, 14, 59)));
        assert!(due(fire, at(8, 15, 0)));
        assert!(due(fire, at(8, 15, 59)));
        assert!(!due(fire, at(8, 16, 0)));
        assert!(!due(fire, at(20, 15, 30)));
    }

    #[test]
    fn registrations_settle_then_land_in_the_pending_set() {
        let (host, _fired) = spawn();
        let id = Uuid::new_v4();
        let trigger = Trigger {
            id,
            fire: FireTime { hour: 3, minute: 0 },
            message: "settle".to_string(),
            sound: None,
        };
        host.register(trigger, Duration::ZERO).unwrap();
        assert!(
            wait_for(|| host.pending().contains(&id)),
            "trigger never landed"
        );
        host.cancel(id).unwrap();
        assert!(
            wait_for(|| host.pending().is_empty()),
            "trigger never cancelled"
        );
    }

    #[test]
    fn cancel_all_empties_the_pending_set() {
        let (host, _fired) = spawn();
        for _ in 0..3 {
            let trigger = Trigger {
                id: Uuid::new_v4(),
                fire: FireTime { hour: 4, minute: 0 },
                message: "bulk".to_string(),
                sound: None,
            };
            host.register(trigger, Duration::ZERO).unwrap();
        }
        assert!(wait_for(|| host.pending().len() == 3));
        host.cancel_all().unwrap();
        assert!(wait_for(|| host.pending().is_empty()));
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(25));
        }
        false
    }
}
