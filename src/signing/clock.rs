//! Nanosecond timestamps for the `X-Timestamp` header

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_TIMESTAMP: AtomicU64 = AtomicU64::new(0);

/// Wall-clock nanoseconds since the Unix epoch, strictly increasing within
/// the process. Calls landing on the same nanosecond are bumped by one.
pub fn timestamp_nanos() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0);
    let previous = match LAST_TIMESTAMP.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last.saturating_add(1)))
    }) {
        Ok(previous) | Err(previous) => previous,
    };
    now.max(previous.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_strictly_increasing() {
        let mut last = timestamp_nanos();
        for _ in 0..10_000 {
            let next = timestamp_nanos();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| (0..1000).map(|_| timestamp_nanos()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_close_to_wall_clock() {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64;
        let stamp = timestamp_nanos();
        // Within one second of the wall clock
        assert!(stamp.abs_diff(wall) < 1_000_000_000);
    }
}
