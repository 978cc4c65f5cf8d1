use embedded_hal::digital::{InputPin, PinState};

use crate::clock::Clock;
use crate::error::DhtError;
use crate::frame::RawFrame;
use crate::variant::TimingProfile;

/// Pulse-width decoder over the data line.
///
/// Holds the pin and clock for the duration of one transaction.
pub(crate) struct Line<'a, PIN, CLOCK> {
    pin: &'a mut PIN,
    clock: &'a CLOCK,
    timing: TimingProfile,
}

impl<'a, PIN, CLOCK, E> Line<'a, PIN, CLOCK>
where
    PIN: InputPin<Error = E>,
    CLOCK: Clock,
{
    pub(crate) fn new(pin: &'a mut PIN, clock: &'a CLOCK, timing: TimingProfile) -> Self {
        Line { pin, clock, timing }
    }

    pub(crate) fn timing(&self) -> TimingProfile {
        self.timing
    }

    /// Waits until the line leaves `level` and returns how long it stayed there, in µs.
    ///
    /// # Errors
    ///
    /// Returns `on_timeout` once more than `timeout_us` elapsed without a level change.
    pub(crate) fn wait_while(
        &mut self,
        level: PinState,
        timeout_us: u32,
        on_timeout: DhtError<E>,
    ) -> Result<u32, DhtError<E>> {
        let start = self.clock.now_us();
        loop {
            let elapsed = self.clock.elapsed_us(start);
            let at_level = match level {
                PinState::High => self.pin.is_high()?,
                PinState::Low => self.pin.is_low()?,
            };
            if !at_level {
                return Ok(elapsed);
            }
            if elapsed > timeout_us {
                return Err(on_timeout);
            }
        }
    }

    /// Reads a single bit from the sensor.
    ///
    /// Each bit starts with a low pulse; the length of the following high
    /// pulse tells a `0` (~26 µs) from a `1` (~70 µs). Both durations are
    /// recorded in `frame` at position `index`.
    pub(crate) fn read_bit(
        &mut self,
        frame: &mut RawFrame,
        index: usize,
    ) -> Result<bool, DhtError<E>> {
        let timeout = self.timing.bit_timeout_us;

        self.wait_while(PinState::High, timeout, DhtError::BitTimeout)?;
        let low = self.wait_while(PinState::Low, timeout, DhtError::BitTimeout)?;
        let high = self.wait_while(PinState::High, timeout, DhtError::BitTimeout)?;

        let slots = (frame.low_us.get_mut(index), frame.high_us.get_mut(index));
        if let (Some(low_slot), Some(high_slot)) = slots {
            *low_slot = saturate(low);
            *high_slot = saturate(high);
        }

        Ok(high > self.timing.high_threshold_us)
    }

    /// Reads one byte (8 bits, MSB first) starting at bit position `first_bit`.
    pub(crate) fn read_byte(
        &mut self,
        frame: &mut RawFrame,
        first_bit: usize,
    ) -> Result<u8, DhtError<E>> {
        let mut byte: u8 = 0;

        for i in 0..8 {
            let bit_mask = 1 << (7 - i);
            if self.read_bit(frame, first_bit + i)? {
                byte |= bit_mask;
            }
        }

        Ok(byte)
    }

    /// Reads the five payload bytes into `frame.bytes`.
    pub(crate) fn read_payload(&mut self, frame: &mut RawFrame) -> Result<(), DhtError<E>> {
        for i in 0..frame.bytes.len() {
            let byte = self.read_byte(frame, i * 8)?;
            frame.bytes[i] = byte;
        }
        Ok(())
    }
}

fn saturate(us: u32) -> u16 {
    u16::try_from(us).unwrap_or(u16::MAX)
}
