//! Unit tests for log.rs

use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOGGER TESTS
// ============================================================================

struct CollectingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CollectingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

#[test]
fn test_custom_logger_receives_entry() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let logger = CollectingLogger { entries: entries.clone() };

    logger.log(&LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "galaxy3d::AssetContainer".to_string(),
        message: "renamed".to_string(),
        file: None,
        line: None,
    });

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, "galaxy3d::AssetContainer");
    assert_eq!(entries[0].severity, LogSeverity::Warn);
}

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "detailed".to_string(),
        file: Some("log_tests.rs"),
        line: Some(42),
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Trace,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "plain".to_string(),
        file: None,
        line: None,
    });
}

// ============================================================================
// ERROR MACROS
// ============================================================================

fn bail_when(flag: bool) -> Result<u32> {
    if flag {
        crate::engine_bail!("galaxy3d::test", "bailed with {}", 7);
    }
    Ok(1)
}

#[test]
fn test_engine_bail_returns_backend_error() {
    assert_eq!(bail_when(false), Ok(1));
    assert_eq!(bail_when(true), Err(Error::BackendError("bailed with 7".to_string())));
}

#[test]
fn test_engine_err_evaluates_to_error() {
    let err = crate::engine_err!("galaxy3d::test", "lock {} poisoned", "device");
    assert_eq!(err, Error::BackendError("lock device poisoned".to_string()));
}
