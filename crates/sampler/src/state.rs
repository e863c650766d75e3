//! Guarded runtime state shared by a sensor's worker and its control surface

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use contracts::OperationMode;

/// Mutable sensor state
///
/// Only ever touched through [`Shared::lock`].
#[derive(Debug)]
pub(crate) struct SensorState {
    pub enabled: bool,
    pub sampling_period: Duration,
    pub last_sample: Option<Instant>,
    pub mode: OperationMode,
    pub stop_requested: bool,
}

impl SensorState {
    pub fn new(sampling_period: Duration) -> Self {
        Self {
            enabled: false,
            sampling_period,
            last_sample: None,
            mode: OperationMode::Normal,
            stop_requested: false,
        }
    }

    /// Enabled and not suspended by data injection
    pub fn is_active(&self) -> bool {
        self.enabled && self.mode == OperationMode::Normal
    }

    fn must_park(&self) -> bool {
        !self.is_active() && !self.stop_requested
    }
}

/// State plus the condition the worker waits on
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<SensorState>,
    changed: Condvar,
}

impl Shared {
    pub fn new(state: SensorState) -> Self {
        Self {
            state: Mutex::new(state),
            changed: Condvar::new(),
        }
    }

    /// Lock the state
    ///
    /// A panic in a sink while the lock was held leaves the state itself
    /// consistent, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, SensorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake every waiter; call while holding the lock
    pub fn notify(&self) {
        self.changed.notify_all();
    }

    /// Block until the sensor is active again or a stop is requested
    pub fn park<'a>(&self, guard: MutexGuard<'a, SensorState>) -> MutexGuard<'a, SensorState> {
        self.changed
            .wait_while(guard, |state| state.must_park())
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until notified or `timeout` elapses
    pub fn sleep<'a>(
        &self,
        guard: MutexGuard<'a, SensorState>,
        timeout: Duration,
    ) -> MutexGuard<'a, SensorState> {
        match self.changed.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}
