//! Structured JSON-lines logging for the proxy.
//!
//! Every record is one JSON object on stdout. When `LOG_DIR` is set the same
//! lines are also appended under `<LOG_DIR>/<run_id>/`, info and above to
//! `events.jsonl`, trace and debug to `trace.jsonl`.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    const NAMES: [(Level, &'static str); 5] = [
        (Level::Trace, "trace"),
        (Level::Debug, "debug"),
        (Level::Info, "info"),
        (Level::Warn, "warn"),
        (Level::Error, "error"),
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(level, _)| *level)
    }

    /// `LOG_LEVEL`, defaulting to info.
    pub fn threshold() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(Level::Info)
    }

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Http,
    Upstream,
    System,
    Profile,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Http => "http",
            Domain::Upstream => "upstream",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    /// `LOG_DOMAINS` is a comma list or `all`; unset means all.
    pub fn is_enabled(self) -> bool {
        match std::env::var("LOG_DOMAINS") {
            Err(_) => true,
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .any(|d| d == "all" || d == self.as_str()),
        }
    }
}

const REDACTED_KEYS: [&str; 3] = ["authorization", "cookie", "set-cookie"];
const TOP_LEVEL_KEYS: [&str; 3] = ["method", "path", "status"];

static SEQ: AtomicU64 = AtomicU64::new(0);
static SINK: OnceLock<Sink> = OnceLock::new();

struct Files {
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

struct Sink {
    run_id: String,
    files: Option<Files>,
}

impl Sink {
    fn from_env() -> Self {
        let run_id = std::env::var("RUN_ID").unwrap_or_else(|_| {
            format!("r-{}-{}", Utc::now().timestamp_millis(), std::process::id())
        });
        let files = std::env::var("LOG_DIR")
            .ok()
            .and_then(|dir| Files::open(&Path::new(&dir).join(&run_id)));
        Self { run_id, files }
    }

    fn write(&self, level: Level, line: &str) {
        if let Some(files) = &self.files {
            let target = if level <= Level::Debug { &files.trace } else { &files.events };
            if let Ok(mut w) = target.lock() {
                let _ = writeln!(w, "{}", line).and_then(|_| w.flush());
            }
        }
        println!("{}", line);
    }
}

impl Files {
    fn open(dir: &Path) -> Option<Self> {
        let open = |name: &str| -> Option<Mutex<BufWriter<File>>> {
            let path: PathBuf = dir.join(name);
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map(|f| Mutex::new(BufWriter::new(f)))
                .map_err(|err| eprintln!("[log] cannot open {}: {}", path.display(), err))
                .ok()
        };
        if let Err(err) = create_dir_all(dir) {
            eprintln!("[log] cannot create {}: {}", dir.display(), err);
            return None;
        }
        Some(Self {
            events: open("events.jsonl")?,
            trace: open("trace.jsonl")?,
        })
    }
}

fn sink() -> &'static Sink {
    SINK.get_or_init(Sink::from_env)
}

pub fn run_id() -> &'static str {
    &sink().run_id
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::threshold() || !domain.is_enabled() {
        return;
    }
    let sink = sink();
    let seq = SEQ.fetch_add(1, Ordering::SeqCst);
    let line = render_record(level, &sink.run_id, seq, domain.as_str(), event, fields);
    sink.write(level, &line);
}

pub(crate) fn render_record(
    level: Level,
    run_id: &str,
    seq: u64,
    component: &str,
    event: &str,
    mut data: Map<String, Value>,
) -> String {
    for (key, value) in data.iter_mut() {
        if REDACTED_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
            *value = json!("[REDACTED]");
        }
    }

    let mut entry = obj(&[
        ("ts", json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))),
        ("run_id", json!(run_id)),
        ("seq", json!(seq)),
        ("lvl", json!(level.as_str().to_uppercase())),
        ("component", json!(component)),
        ("event", json!(event)),
        ("msg", data.remove("msg").unwrap_or_else(|| json!(""))),
    ]);
    for key in TOP_LEVEL_KEYS {
        if let Some(value) = data.remove(key) {
            entry.insert(key.to_string(), value);
        }
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

pub fn log_startup(bind_addr: &str, upstream: &str, timeout_ms: u64) {
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("bind_addr", v_str(bind_addr)),
            ("upstream", v_str(upstream)),
            ("timeout_ms", json!(timeout_ms)),
        ]),
    );
}

pub fn log_request(method: &str, path: &str, status: u16, elapsed_ms: f64) {
    let level = if status >= 500 { Level::Warn } else { Level::Info };
    log(
        level,
        Domain::Http,
        "request",
        obj(&[
            ("method", v_str(method)),
            ("path", v_str(path)),
            ("status", json!(status)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
}

pub fn log_upstream_fetch(status: u16, bytes: usize, digest: &str) {
    log(
        Level::Debug,
        Domain::Upstream,
        "fetch",
        obj(&[
            ("status", json!(status)),
            ("bytes", json!(bytes)),
            ("digest", v_str(digest)),
        ]),
    );
}

pub fn log_upstream_error(kind: &str, detail: &str) {
    log(
        Level::Error,
        Domain::Upstream,
        "error",
        obj(&[("kind", v_str(kind)), ("msg", v_str(detail))]),
    );
}

/// SHA-256 hex fingerprint of a payload, for correlating upstream bodies.
pub fn body_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

/// Emits a trace-level `profile` record with the elapsed time when dropped.
pub struct ProfileScope {
    label: &'static str,
    fields: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            fields: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let mut fields = std::mem::take(&mut self.fields);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert(
            "elapsed_ms".to_string(),
            v_num(self.started.elapsed().as_secs_f64() * 1000.0),
        );
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}
