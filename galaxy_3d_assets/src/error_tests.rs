//! Unit tests for error.rs

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("device lost".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("device lost"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_capacity_exceeded_display() {
    let err = Error::CapacityExceeded("bindless texture table full (100)".to_string());
    let display = format!("{}", err);
    assert!(display.starts_with("Capacity exceeded"));
    assert!(display.contains("(100)"));
}

#[test]
fn test_contract_violation_display() {
    let err = Error::ContractViolation("index size 1".to_string());
    assert_eq!(format!("{}", err), "Contract violation: index size 1");
}

#[test]
fn test_io_and_parse_display() {
    assert_eq!(format!("{}", Error::Io("nope".to_string())), "I/O error: nope");
    assert_eq!(format!("{}", Error::Parse("line 3".to_string())), "Parse error: line 3");
}

// ============================================================================
// CONVERSIONS AND TRAITS
// ============================================================================

#[test]
fn test_from_io_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.obj");
    let err: Error = io.into();
    match err {
        Error::Io(msg) => assert!(msg.contains("missing.obj")),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_result_question_mark() {
    fn inner() -> Result<u32> {
        Err(Error::InvalidResource("x".to_string()))
    }
    fn outer() -> Result<u32> {
        let v = inner()?;
        Ok(v + 1)
    }
    assert_eq!(outer(), Err(Error::InvalidResource("x".to_string())));
}
