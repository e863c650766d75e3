//! Event timestamp clock
//!
//! Monotonic nanoseconds since the first call in this process.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds elapsed on the monotonic event clock
pub fn elapsed_nanos() -> i64 {
    let epoch = *EPOCH.get_or_init(Instant::now);
    i64::try_from(epoch.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let a = elapsed_nanos();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = elapsed_nanos();
        assert!(b > a);
        assert!(b - a >= 2_000_000);
    }
}
