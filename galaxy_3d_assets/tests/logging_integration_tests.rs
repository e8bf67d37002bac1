//! Integration tests for Engine logging system
//!
//! These tests verify that the global logger receives the asset subsystem's
//! messages. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests


use galaxy_3d_assets::galaxy3d::log::{LogEntry, LogSeverity, Logger};
use galaxy_3d_assets::galaxy3d::{AssetConfig, AssetSubsystem, Engine};
use galaxy_3d_assets::{engine_error, engine_info};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use test_device_utils::create_test_device;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn find<'a>(entries: &'a [LogEntry], source: &str, needle: &str) -> Option<&'a LogEntry> {
    entries.iter().find(|e| e.source == source && e.message.contains(needle))
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_macros_reach_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    engine_info!("test::module", "Loaded {} meshes", 2);
    engine_error!("test::module", "Texture {} missing", "albedo.png");

    let captured = entries.lock().unwrap().clone();
    Engine::reset_logger();

    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].message, "Loaded 2 meshes");
    assert_eq!(captured[0].file, None);

    // Errors carry their location
    assert_eq!(captured[1].severity, LogSeverity::Error);
    assert_eq!(captured[1].message, "Texture albedo.png missing");
    assert!(captured[1].file.is_some_and(|f| f.ends_with("logging_integration_tests.rs")));
    assert!(captured[1].line.is_some());
}

#[test]
#[serial]
fn test_integration_subsystem_lifecycle_is_logged() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let (device, _stats) = create_test_device();
    let mut subsystem = AssetSubsystem::new(&AssetConfig::default(), device);
    subsystem.initialize().unwrap();
    subsystem.destroy();

    let captured = entries.lock().unwrap().clone();
    Engine::reset_logger();

    assert!(find(&captured, "galaxy3d::AssetManager", "initialized").is_some());
    assert!(find(&captured, "galaxy3d::AssetManager", "destroyed").is_some());
}

#[test]
#[serial]
fn test_integration_missing_asset_is_logged_once() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let (device, _stats) = create_test_device();
    let mut subsystem = AssetSubsystem::new(&AssetConfig::default(), device);
    subsystem.initialize().unwrap();
    subsystem.load_composite_mesh("ghost.obj").unwrap();
    subsystem.load_composite_mesh("ghost.obj").unwrap();

    let captured = entries.lock().unwrap().clone();
    Engine::reset_logger();

    let misses: Vec<_> = captured
        .iter()
        .filter(|e| e.source == "galaxy3d::AssetContainer" && e.message.contains("ghost.obj"))
        .collect();
    assert_eq!(misses.len(), 1);
    assert_eq!(misses[0].severity, LogSeverity::Error);
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
}
