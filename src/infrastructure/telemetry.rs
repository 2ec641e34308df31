use crate::domain::ports::Telemetry;
use crate::domain::telemetry::{Beacon, LogEntry, LogLevel, TrackEvent};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

#[derive(Default)]
struct Buffers {
    pending: Vec<Beacon>,
    flushed: Vec<Beacon>,
    flushes: usize,
}

/// Buffers beacons until flushed, then forwards them to `tracing`.
///
/// Flushed beacons are retained so callers can inspect or export them.
#[derive(Default)]
pub struct BufferedTelemetry {
    buffers: Mutex<Buffers>,
}

impl BufferedTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffers(&self) -> MutexGuard<'_, Buffers> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, beacon: Beacon) {
        self.buffers().pending.push(beacon);
    }

    fn log(&self, level: LogLevel, event: &str) {
        self.push(Beacon::Log(LogEntry {
            level,
            event: event.to_string(),
        }));
    }

    pub fn pending(&self) -> Vec<Beacon> {
        self.buffers().pending.clone()
    }

    pub fn pending_logs(&self) -> Vec<LogEntry> {
        logs(&self.buffers().pending)
    }

    pub fn flushed(&self) -> Vec<Beacon> {
        self.buffers().flushed.clone()
    }

    pub fn flushed_logs(&self) -> Vec<LogEntry> {
        logs(&self.buffers().flushed)
    }

    pub fn flushed_tracks(&self) -> Vec<TrackEvent> {
        self.buffers()
            .flushed
            .iter()
            .filter_map(|beacon| match beacon {
                Beacon::Track(event) => Some(event.clone()),
                Beacon::Log(_) => None,
            })
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.buffers().flushes
    }
}

fn logs(beacons: &[Beacon]) -> Vec<LogEntry> {
    beacons
        .iter()
        .filter_map(|beacon| match beacon {
            Beacon::Log(entry) => Some(entry.clone()),
            Beacon::Track(_) => None,
        })
        .collect()
}

impl Telemetry for BufferedTelemetry {
    fn info(&self, event: &str) {
        self.log(LogLevel::Info, event);
    }

    fn warn(&self, event: &str) {
        self.log(LogLevel::Warn, event);
    }

    fn error(&self, event: &str) {
        self.log(LogLevel::Error, event);
    }

    fn track(&self, event: TrackEvent) {
        self.push(Beacon::Track(event));
    }

    fn flush(&self) {
        let mut buffers = self.buffers();
        let batch = std::mem::take(&mut buffers.pending);
        for beacon in &batch {
            match beacon {
                Beacon::Log(LogEntry { level: LogLevel::Info, event }) => {
                    info!(target: "paybutton::telemetry", %event)
                }
                Beacon::Log(LogEntry { level: LogLevel::Warn, event }) => {
                    warn!(target: "paybutton::telemetry", %event)
                }
                Beacon::Log(LogEntry { level: LogLevel::Error, event }) => {
                    error!(target: "paybutton::telemetry", %event)
                }
                Beacon::Track(track) => info!(
                    target: "paybutton::telemetry",
                    state = ?track.state,
                    transition = ?track.transition,
                    button_session_uid = %track.button_session_uid,
                    "track"
                ),
            }
        }
        buffers.flushed.extend(batch);
        buffers.flushes += 1;
    }
}
