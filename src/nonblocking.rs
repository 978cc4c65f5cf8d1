//! Poll-driven acquisition for cooperative main loops.
//!
//! [`Dht::start_async_read`] begins the start pulse and returns at once;
//! [`Dht::process_async`] must then be called from the main loop until it
//! yields the reading. Only the 40 payload bits are read in one blocking
//! stretch (about 5 ms), since the sensor sends them without pause.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::clock::Clock;
use crate::decoder::Line;
use crate::dht::Dht;
use crate::error::{DhtError, ErrorKind};
use crate::protocol::{self, START_HIGH_US};
use crate::reading::Reading;

/// Called exactly once with the outcome of a non-blocking read.
pub type Callback = fn(Reading);

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AsyncState {
    Idle,
    /// Line held low since `since` (µs).
    StartSignal { since: u32 },
    /// Line released at `since` (µs), waiting for the sensor to pull it low.
    WaitAck { since: u32 },
    ReadBits,
    Failed(ErrorKind),
}

impl<PIN, DELAY, CLOCK, E> Dht<PIN, DELAY, CLOCK>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    /// Starts a non-blocking read; `callback` receives the result.
    ///
    /// Returns `Ok(false)` without doing anything if a read is already in progress.
    pub fn start_async_read(&mut self, callback: Callback) -> Result<bool, DhtError<E>> {
        if self.is_reading() {
            return Ok(false);
        }
        self.callback = Some(callback);

        if self.test_mode {
            self.async_state = AsyncState::ReadBits;
            return Ok(true);
        }

        self.pin.set_low()?;
        self.async_state = AsyncState::StartSignal {
            since: self.clock.now_us(),
        };
        Ok(true)
    }

    /// Advances the non-blocking read.
    ///
    /// Returns the reading once the read is complete, after handing it to the
    /// callback. On failure that reading is the last good one (or NaN) tagged
    /// with the error, like [`Dht::data`].
    pub fn process_async(&mut self) -> Option<Reading> {
        let timing = self.variant.timing();

        loop {
            match self.async_state {
                AsyncState::Idle => return None,
                AsyncState::StartSignal { since } => {
                    if self.clock.elapsed_us(since) < timing.start_low_ms.saturating_mul(1000) {
                        return None;
                    }
                    if self.pin.set_high().is_err() {
                        self.async_state = AsyncState::Failed(ErrorKind::Pin);
                        continue;
                    }
                    self.delay.delay_us(START_HIGH_US);
                    self.async_state = AsyncState::WaitAck {
                        since: self.clock.now_us(),
                    };
                    return None;
                }
                AsyncState::WaitAck { since } => {
                    let elapsed = self.clock.elapsed_us(since);
                    if elapsed < timing.ack_settle_us {
                        return None;
                    }
                    match self.pin.is_low() {
                        Ok(true) => self.async_state = AsyncState::ReadBits,
                        Ok(false) if elapsed > timing.ack_timeout_us => {
                            self.async_state = AsyncState::Failed(ErrorKind::NoResponse)
                        }
                        Ok(false) => return None,
                        Err(_) => self.async_state = AsyncState::Failed(ErrorKind::Pin),
                    }
                }
                AsyncState::ReadBits => {
                    let reading = match self.receive_async() {
                        Ok(reading) => {
                            self.record_success(reading);
                            reading
                        }
                        Err(err) => {
                            self.record_failure(err.kind());
                            self.data()
                        }
                    };
                    return Some(self.complete(reading));
                }
                AsyncState::Failed(kind) => {
                    self.record_failure(kind);
                    let reading = self.data();
                    return Some(self.complete(reading));
                }
            }
        }
    }

    /// `true` while a non-blocking read is in progress.
    pub fn is_reading(&self) -> bool {
        self.async_state != AsyncState::Idle
    }

    /// Reads the rest of the transmission once the sensor acknowledged.
    fn receive_async(&mut self) -> Result<Reading, DhtError<E>> {
        if self.test_mode {
            self.fetch_frame()?;
        } else {
            self.raw = Default::default();
            let mut line = Line::new(&mut self.pin, &self.clock, self.variant.timing());
            protocol::receive(&mut line, &mut self.raw)?;
        }
        self.evaluate()
    }

    fn complete(&mut self, reading: Reading) -> Reading {
        self.async_state = AsyncState::Idle;
        self.last_acquisition_us = Some(self.clock.now_us());
        if let Some(callback) = self.callback.take() {
            callback(reading);
        }
        reading
    }
}
