use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ColorizeStarted,
    RequestEncoded,
    ResponseReceived,
    ColorizeFinished,
    ColorizeFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ColorizeStarted => "colorize_started",
            EventKind::RequestEncoded => "request_encoded",
            EventKind::ResponseReceived => "response_received",
            EventKind::ColorizeFinished => "colorize_finished",
            EventKind::ColorizeFailed => "colorize_failed",
        }
    }
}

/// Append-only JSONL log of pipeline events.
///
/// Each line carries `type`, `invocation_id` and `ts`; the caller payload is
/// merged last. Clones share the file and the append lock.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn emit(
        &self,
        kind: EventKind,
        invocation_id: &str,
        payload: EventPayload,
    ) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        event.insert(
            "invocation_id".to_string(),
            Value::String(invocation_id.to_string()),
        );
        event.insert("ts".to_string(), Value::String(now_utc_iso()));
        event.extend(payload);

        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?
            .write_all(line.as_bytes())?;

        Ok(Value::Object(event))
    }

    /// Reads every event back, skipping lines that are not JSON objects.
    pub fn read_all(&self) -> anyhow::Result<Vec<Map<String, Value>>> {
        let raw = match fs::read_to_string(&self.inner.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|row| row.as_object().cloned())
            .collect())
    }
}

pub fn new_invocation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
