/// Monotonic capped counter for fixed-size GPU tables.
///
/// Hands out contiguous ranges of `u32` slots (bindless texture indices,
/// material buffer entries). Slots are never recycled: assets live for the
/// whole subsystem lifetime.
///
/// # Example
///
/// ```ignore
/// let mut slots = SlotCounter::new("material entries", 8);
/// assert_eq!(slots.reserve(3)?, 0);   // 0..3
/// assert_eq!(slots.reserve(5)?, 3);   // 3..8
/// assert!(slots.reserve(1).is_err()); // full
/// ```

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SlotCounter {
    label: &'static str,
    next: u32,
    capacity: u32,
}

impl SlotCounter {
    /// `label` names the table in capacity errors
    pub fn new(label: &'static str, capacity: u32) -> Self {
        Self { label, next: 0, capacity }
    }

    /// Reserve `count` consecutive slots and return the first one
    pub fn reserve(&mut self, count: u32) -> Result<u32> {
        let end = self.next.checked_add(count).filter(|end| *end <= self.capacity);
        match end {
            Some(end) => {
                let first = self.next;
                self.next = end;
                Ok(first)
            }
            None => Err(Error::CapacityExceeded(format!(
                "{}: requested {} slots, {} of {} in use",
                self.label, count, self.next, self.capacity
            ))),
        }
    }

    /// Slots handed out so far
    pub fn len(&self) -> u32 {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn remaining(&self) -> u32 {
        self.capacity - self.next
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_counter_tests.rs"]
mod tests;
