//! Human-readable, collision-free order codes.
//!
//! Codes look like `ORD-20260806-0042`: a per-day sequence behind a single
//! lock, so concurrent checkouts inside the same time window can never
//! observe the same value. The ledger's uniqueness constraint remains the
//! backstop across processes; callers retry on conflict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::domain::foundation::Timestamp;

/// Unique, human-readable order reference shared with payment gateways.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Wraps an existing code string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct DaySequence {
    day: NaiveDate,
    next: u32,
}

/// Allocates order codes from an atomic per-day sequence.
///
/// The sequence resets at each UTC day boundary. Allocation never reads
/// back previously issued codes, so there is no read-then-increment window
/// for two concurrent checkouts to race through.
#[derive(Debug)]
pub struct OrderCodeAllocator {
    state: Mutex<DaySequence>,
}

impl OrderCodeAllocator {
    /// Creates an allocator starting a fresh sequence for the current day.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DaySequence {
                day: Timestamp::now().date(),
                next: 1,
            }),
        }
    }

    /// Allocates the next order code for the day of `now`.
    pub fn allocate(&self, now: Timestamp) -> OrderCode {
        let mut state = self.state.lock().expect("order code allocator lock poisoned");
        let day = now.date();
        if state.day != day {
            state.day = day;
            state.next = 1;
        }
        let seq = state.next;
        state.next += 1;
        OrderCode(format!("ORD-{}-{:04}", day.format("%Y%m%d"), seq))
    }
}

impl Default for OrderCodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn codes_carry_the_day_and_sequence() {
        let allocator = OrderCodeAllocator::new();
        let now = Timestamp::from_unix_secs(1_767_225_600); // 2026-01-01 UTC

        let first = allocator.allocate(now);
        let second = allocator.allocate(now);

        assert_eq!(first.as_str(), "ORD-20260101-0001");
        assert_eq!(second.as_str(), "ORD-20260101-0002");
    }

    #[test]
    fn sequence_resets_at_day_boundary() {
        let allocator = OrderCodeAllocator::new();
        let day_one = Timestamp::from_unix_secs(1_767_225_600);
        let day_two = day_one.add_days(1);

        allocator.allocate(day_one);
        allocator.allocate(day_one);
        let next_day = allocator.allocate(day_two);

        assert_eq!(next_day.as_str(), "ORD-20260102-0001");
    }

    #[test]
    fn hundred_concurrent_allocations_same_day_never_collide() {
        let allocator = Arc::new(OrderCodeAllocator::new());
        let now = Timestamp::from_unix_secs(1_767_225_600);

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let allocator = allocator.clone();
                std::thread::spawn(move || allocator.allocate(now))
            })
            .collect();

        let codes: HashSet<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().as_str().to_string())
            .collect();

        assert_eq!(codes.len(), 100);
    }

    #[test]
    fn sequence_keeps_growing_past_four_digits() {
        let allocator = OrderCodeAllocator::new();
        let now = Timestamp::from_unix_secs(1_767_225_600);

        let mut last = String::new();
        for _ in 0..10_000 {
            last = allocator.allocate(now).as_str().to_string();
        }
        let overflow = allocator.allocate(now);

        assert_eq!(last, "ORD-20260101-10000");
        assert_eq!(overflow.as_str(), "ORD-20260101-10001");
    }
}
