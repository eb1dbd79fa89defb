//! Structured logging for the section tracker and its outer surfaces.
//!
//! Every record is one JSON object per line on stderr:
//! `{"ts", "seq", "lvl", "component", "event", "msg", "section"?, "data"}`.
//! Filtering is driven by `LOG_LEVEL` and `LOG_DOMAINS` (comma-separated or `all`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Nav,        // Clicks, highlighted link changes
    Visibility, // Threshold crossings, activations, suppressions
    Form,       // Contact validation and submission
    Gallery,    // Media widget polling and lifecycle
    System,     // Startup, configuration
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Nav => "nav",
            Domain::Visibility => "visibility",
            Domain::Form => "form",
            Domain::Gallery => "gallery",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

// Contact details never reach the log stream.
fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["email", "message", "authorization"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["section", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    eprintln!("{}", render_record(level, domain, event, fields));
}

fn render_record(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) -> String {
    let fields = sanitize_fields(fields);
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_activation(section: &str, outcome: &str, now_ms: u64) {
    log(
        Level::Debug,
        Domain::Visibility,
        "activation",
        obj(&[
            ("section", v_str(section)),
            ("outcome", v_str(outcome)),
            ("now_ms", json!(now_ms)),
        ]),
    );
}

pub fn log_crossing(section: &str, in_view: bool, ratio: f64, threshold: f64) {
    log(
        Level::Trace,
        Domain::Visibility,
        "crossing",
        obj(&[
            ("section", v_str(section)),
            ("in_view", json!(in_view)),
            ("ratio", v_num(ratio)),
            ("threshold", v_num(threshold)),
        ]),
    );
}

pub fn log_click(section: &str, anchor: &str, ts_ms: u64) {
    log(
        Level::Info,
        Domain::Nav,
        "manual_click",
        obj(&[
            ("section", v_str(section)),
            ("anchor", v_str(anchor)),
            ("ts_ms", json!(ts_ms)),
        ]),
    );
}

pub fn log_foreign_section(op: &str, index: usize) {
    log(
        Level::Warn,
        Domain::Nav,
        "foreign_section",
        obj(&[("op", v_str(op)), ("index", json!(index))]),
    );
}

pub fn log_submit(endpoint: &str, result: &str, detail: Option<&str>) {
    let level = if result == "sent" { Level::Info } else { Level::Warn };
    log(
        level,
        Domain::Form,
        "submit",
        obj(&[
            ("endpoint", v_str(endpoint)),
            ("result", v_str(result)),
            ("detail", detail.map(v_str).unwrap_or(Value::Null)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_contact_fields_redacted() {
        let line = render_record(
            Level::Info,
            Domain::Form,
            "submit",
            obj(&[("email", v_str("a@b.com")), ("message", v_str("hello there"))]),
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["data"]["email"], "[REDACTED]");
        assert_eq!(parsed["data"]["message"], "[REDACTED]");
        assert!(!line.contains("a@b.com"));
    }

    #[test]
    fn test_section_lifted_to_top_level() {
        let line = render_record(
            Level::Debug,
            Domain::Visibility,
            "activation",
            obj(&[("section", v_str("Services")), ("outcome", v_str("promoted"))]),
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["section"], "Services");
        assert_eq!(parsed["component"], "visibility");
        assert_eq!(parsed["lvl"], "DEBUG");
        assert_eq!(parsed["data"]["outcome"], "promoted");
    }
}
