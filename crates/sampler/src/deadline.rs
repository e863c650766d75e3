//! Deadline math for the timed strategy

use std::time::{Duration, Instant};

/// Outcome of a deadline check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// `now` has reached `last_sample + period`: take a sample
    Due,
    /// Sleep this long before checking again
    Pending(Duration),
}

/// Decide whether a sample is due at `now`.
///
/// A sensor that never sampled is always due.
pub fn check(now: Instant, last_sample: Option<Instant>, period: Duration) -> Deadline {
    let Some(last) = last_sample else {
        return Deadline::Due;
    };

    match last.checked_add(period) {
        Some(next) => match next.checked_duration_since(now) {
            Some(remaining) if !remaining.is_zero() => Deadline::Pending(remaining),
            _ => Deadline::Due,
        },
        // Deadline beyond the clock's range
        None => Deadline::Pending(period),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(20);

    #[test]
    fn test_first_sample_is_due() {
        assert_eq!(check(Instant::now(), None, PERIOD), Deadline::Due);
    }

    #[test]
    fn test_pending_before_deadline() {
        let last = Instant::now();
        let now = last + Duration::from_millis(5);
        assert_eq!(
            check(now, Some(last), PERIOD),
            Deadline::Pending(Duration::from_millis(15))
        );
    }

    #[test]
    fn test_due_exactly_at_deadline() {
        let last = Instant::now();
        assert_eq!(check(last + PERIOD, Some(last), PERIOD), Deadline::Due);
    }

    #[test]
    fn test_due_after_deadline() {
        let last = Instant::now();
        let now = last + Duration::from_millis(75);
        assert_eq!(check(now, Some(last), PERIOD), Deadline::Due);
    }

    #[test]
    fn test_shortened_period_is_due_immediately() {
        // Sampled 30ms ago with a 1s period, then the period drops to 20ms
        let last = Instant::now();
        let now = last + Duration::from_millis(30);
        assert!(matches!(
            check(now, Some(last), Duration::from_secs(1)),
            Deadline::Pending(_)
        ));
        assert_eq!(check(now, Some(last), PERIOD), Deadline::Due);
    }

    #[test]
    fn test_lengthened_period_extends_wait() {
        let last = Instant::now();
        let now = last + Duration::from_millis(10);
        assert_eq!(
            check(now, Some(last), Duration::from_millis(100)),
            Deadline::Pending(Duration::from_millis(90))
        );
    }

    #[test]
    fn test_zero_period_always_due() {
        let last = Instant::now();
        assert_eq!(check(last, Some(last), Duration::ZERO), Deadline::Due);
    }
}
