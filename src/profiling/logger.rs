//! JSONL sink for profiling events, one file per process run.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::event::{EventType, ProfileEvent};
use crate::paths;

/// Events between forced flushes
const FLUSH_EVERY: u64 = 100;

static SINK: Mutex<Option<Sink>> = Mutex::new(None);

struct Sink {
    writer: BufWriter<File>,
    written: u64,
}

impl Sink {
    fn create(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    fn write(&mut self, event: &ProfileEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Dropping unserializable profile event: {}", e);
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{line}") {
            tracing::warn!("Profile write failed: {}", e);
            return;
        }
        self.written += 1;
        if self.written % FLUSH_EVERY == 0 {
            let _ = self.writer.flush();
        }
    }
}

fn with_sink(f: impl FnOnce(&mut Sink)) {
    if let Ok(mut guard) = SINK.lock() {
        if let Some(sink) = guard.as_mut() {
            f(sink);
        }
    }
}

/// Open `<DATA_DIR>/profile_<timestamp>.jsonl` and record the session start.
pub fn init() {
    let session_id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let path = paths::profile_log_path(&session_id);

    let sink = match Sink::create(Path::new(&path)) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("Failed to open profile log {}: {}", path, e);
            return;
        }
    };

    let Ok(mut guard) = SINK.lock() else {
        tracing::error!("Profiler lock poisoned");
        return;
    };
    if guard.is_some() {
        tracing::warn!("Profiler already initialized");
        return;
    }
    *guard = Some(sink);
    drop(guard);

    tracing::info!("Profiling enabled: writing to {}", path);
    log_event(EventType::SessionStart { session_id });
}

/// Record the session end, flush and close the log.
pub fn shutdown() {
    let Ok(mut guard) = SINK.lock() else {
        return;
    };
    let Some(mut sink) = guard.take() else {
        return;
    };
    let total_events = sink.written;
    sink.write(&ProfileEvent::new(EventType::SessionEnd { total_events }));
    let _ = sink.writer.flush();
    tracing::info!("Profiling session ended: {} events logged", total_events);
}

pub fn log_event(event_type: EventType) {
    let event = ProfileEvent::new(event_type);
    with_sink(|sink| sink.write(&event));
}

/// Record how long a named scope took
pub fn log_timed(name: &str, duration: Duration) {
    let event = ProfileEvent::with_duration(
        EventType::TimedScope {
            name: name.to_string(),
            duration_ms: duration.as_millis() as u64,
        },
        duration,
    );
    with_sink(|sink| sink.write(&event));
}
