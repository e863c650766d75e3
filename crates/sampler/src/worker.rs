//! Sensor worker thread
//!
//! One thread per sensor, spawned at construction and joined when the
//! sensor is dropped. Both strategies share the same state machine:
//!
//! ```text
//! stop_requested            -> exit
//! !enabled || DataInjection -> park on the condvar
//! otherwise                 -> strategy step
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::deadline::{self, Deadline};
use crate::emitter::Emitter;
use crate::error::{Result, SamplerError};
use crate::hardware::ArmAttribute;
use crate::payload::PayloadSource;
use crate::state::Shared;
use crate::wake::SignalWait;

/// Sampling strategy, fixed at construction
pub(crate) enum Strategy {
    /// Sample every `sampling_period`
    Timed,
    /// Block on a hardware signal, fire once, auto-disable
    ExternalSignal(SignalStrategy),
}

pub(crate) struct SignalStrategy {
    pub wait: SignalWait,
    pub arm: Option<ArmAttribute>,
}

struct Worker {
    shared: Arc<Shared>,
    emitter: Emitter,
    payload: Box<dyn PayloadSource>,
}

/// Spawn the worker thread
pub(crate) fn spawn(
    shared: Arc<Shared>,
    emitter: Emitter,
    payload: Box<dyn PayloadSource>,
    strategy: Strategy,
) -> Result<JoinHandle<()>> {
    let handle = emitter.descriptor().handle;
    let mut worker = Worker {
        shared,
        emitter,
        payload,
    };

    thread::Builder::new()
        .name(format!("sensor-{handle}"))
        .spawn(move || {
            let reason = match strategy {
                Strategy::Timed => worker.run_timed(),
                Strategy::ExternalSignal(signal) => worker.run_external(signal),
            };
            info!(handle, reason, "sensor worker exited");
            observability::record_worker_exit(handle, reason);
        })
        .map_err(|source| SamplerError::Spawn { handle, source })
}

impl Worker {
    fn handle(&self) -> i32 {
        self.emitter.descriptor().handle
    }

    fn run_timed(&mut self) -> &'static str {
        debug!(handle = self.handle(), "timed worker started");

        let mut state = self.shared.lock();
        while !state.stop_requested {
            if !state.is_active() {
                state = self.shared.park(state);
                continue;
            }

            let now = Instant::now();
            if deadline::check(now, state.last_sample, state.sampling_period) == Deadline::Due {
                state.last_sample = Some(now);
                self.emitter.emit_sample(self.payload.as_mut());
            }

            // Wait even when due; a zero timeout still releases the lock
            let remaining = match deadline::check(
                Instant::now(),
                state.last_sample,
                state.sampling_period,
            ) {
                Deadline::Pending(remaining) => remaining,
                Deadline::Due => Duration::ZERO,
            };
            state = self.shared.sleep(state, remaining);
        }

        "stopped"
    }

    fn run_external(&mut self, mut signal: SignalStrategy) -> &'static str {
        let handle = self.handle();
        debug!(handle, "external-signal worker started");

        let mut state = self.shared.lock();
        while !state.stop_requested {
            if !state.is_active() {
                state = self.shared.park(state);
                continue;
            }

            // Never hold the lock across the readiness wait
            drop(state);

            let ready = match signal.wait.wait() {
                Ok(ready) => ready,
                Err(e) => {
                    error!(handle, error = %e, "readiness wait failed, stopping worker");
                    let mut state = self.shared.lock();
                    state.stop_requested = true;
                    return "poll_error";
                }
            };

            let fired = ready.signal
                && match signal.wait.input().read_latched() {
                    Ok(fired) => fired,
                    Err(e) => {
                        debug!(handle, error = %e, "failed to read latched value");
                        false
                    }
                };

            if fired {
                if let Some(arm) = &signal.arm {
                    if let Err(e) = arm.quiesce() {
                        warn!(handle, path = %arm.path().display(), error = %e, "failed to quiesce");
                    }
                }
            }

            state = self.shared.lock();
            // A disable or mode change may have raced the signal
            if fired && state.is_active() && !state.stop_requested {
                state.enabled = false;
                self.emitter.emit_sample(self.payload.as_mut());
                observability::record_one_shot_fired(handle);
                observability::record_sensor_enabled(handle, false);
                debug!(handle, "one-shot fired, sensor disarmed");
            }
        }

        "stopped"
    }
}
