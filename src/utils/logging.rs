//! Signing Pipeline Logging
//!
//! Log lines go to stderr so CLI stdout stays machine-readable JSON.
//! Debug lines are dropped unless `enable_debug` was called.
//!
//! Field values are filtered by key: key material is never printed, and
//! hashes and envelopes are cut down to their ends.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Keys whose values are never written
const HIDDEN_KEYS: &[&str] = &["private_key", "secret"];

/// Keys whose values are shortened to their ends
const SHORTENED_KEYS: &[&str] = &["tx_hash", "signed_tx", "signature"];

pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Warn,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Warn => write!(f, "WARN"),
        }
    }
}

/// One log line under construction
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach `key=value`, filtered by key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, filter_value(key, &value.to_string())));
        self
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }
        eprintln!("{}", self.render());
    }

    fn render(&self) -> String {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        let mut line = format!("[{}] {} [{}] {}", timestamp, self.level, self.module, self.message);
        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push_str(if i == 0 { " | " } else { " " });
            line.push_str(&format!("{}={}", key, value));
        }
        line
    }
}

fn filter_value(key: &str, value: &str) -> String {
    if HIDDEN_KEYS.contains(&key) {
        format!("[hidden:{}]", value.len())
    } else if SHORTENED_KEYS.contains(&key) {
        shorten(value)
    } else {
        value.to_string()
    }
}

/// Keep the `0x` prefix, 8 leading and 4 trailing digits
fn shorten(value: &str) -> String {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.len() <= 16 || !digits.is_ascii() {
        return value.to_string();
    }
    format!("0x{}..{}", &digits[..8], &digits[digits.len() - 4..])
}

/// Log at debug level: `log_debug!(module, message, key = value, ...)`
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Debug, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log()
    };
}

/// Log at warning level: `log_warn!(module, message, key = value, ...)`
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Warn, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log()
    };
}
