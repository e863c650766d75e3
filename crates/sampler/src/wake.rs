//! Readiness wait for external-signal workers
//!
//! The worker blocks on one `mio::Poll` watching two sources:
//! - the sensor's private [`WakeChannel`], written by control calls that
//!   must preempt the wait
//! - the hardware [`LatchedInput`]

use std::io;
use std::sync::Arc;

use contracts::SensorHandle;
use mio::unix::SourceFd;
use mio::{Events, Poll, Token, Waker};
use tracing::warn;

use crate::error::{Result, SamplerError};
use crate::hardware::LatchedInput;

const WAKE: Token = Token(0);
const SIGNAL: Token = Token(1);

/// Interrupts a blocked readiness wait
#[derive(Debug, Clone)]
pub struct WakeChannel {
    handle: SensorHandle,
    waker: Arc<Waker>,
}

impl WakeChannel {
    /// Make the worker's pending (or next) wait return
    ///
    /// Failures are logged; the worker re-checks state on its next return
    /// anyway.
    pub fn wake(&self) {
        if let Err(e) = self.waker.wake() {
            warn!(handle = self.handle, error = %e, "failed to write wake channel");
        }
    }
}

/// Sources that became ready during one wait
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Readiness {
    pub signal: bool,
    pub wake: bool,
}

/// Multiplexed wait owned by the worker thread
pub(crate) struct SignalWait {
    poll: Poll,
    events: Events,
    input: LatchedInput,
}

impl SignalWait {
    /// Create the poll instance, its wake channel, and register `input`
    pub fn new(handle: SensorHandle, input: LatchedInput) -> Result<(Self, WakeChannel)> {
        let poll = Poll::new().map_err(|source| SamplerError::WakeChannel { handle, source })?;
        let waker = Waker::new(poll.registry(), WAKE)
            .map_err(|source| SamplerError::WakeChannel { handle, source })?;

        let fd = std::os::fd::AsRawFd::as_raw_fd(&input);
        poll.registry()
            .register(&mut SourceFd(&fd), SIGNAL, input.interest())
            .map_err(|source| SamplerError::Register { handle, source })?;

        let wait = Self {
            poll,
            events: Events::with_capacity(4),
            input,
        };
        let channel = WakeChannel {
            handle,
            waker: Arc::new(waker),
        };
        Ok((wait, channel))
    }

    /// Block until either source is ready
    ///
    /// An interrupted wait returns with nothing ready.
    pub fn wait(&mut self) -> io::Result<Readiness> {
        match self.poll.poll(&mut self.events, None) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Readiness::default()),
            Err(e) => return Err(e),
        }

        let mut ready = Readiness::default();
        for event in self.events.iter() {
            match event.token() {
                WAKE => ready.wake = true,
                SIGNAL => ready.signal = true,
                _ => {}
            }
        }
        Ok(ready)
    }

    pub fn input(&mut self) -> &mut LatchedInput {
        &mut self.input
    }
}
