//! One blocking request/response exchange with the sensor.
//!
//! ```text
//! host:   ‾‾|__ start __|‾ 30us ‾ (released)
//! sensor:                         |_ 80us _|‾ 80us ‾|_ 50us _|‾ bit ‾|_ ...
//! ```
//!
//! A data bit is a ~50 µs low pulse followed by a high pulse of ~26 µs (`0`)
//! or ~70 µs (`1`). 40 bits follow, MSB first, forming five bytes.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin, PinState},
};

use crate::clock::Clock;
use crate::decoder::Line;
use crate::error::DhtError;
use crate::frame::RawFrame;
use crate::variant::TimingProfile;

/// How long the host keeps the line high after the start pulse before listening.
pub(crate) const START_HIGH_US: u32 = 30;

/// Sends the start signal: pull the line low for `start_low_ms`, then release it.
pub(crate) fn send_start<PIN, DELAY, E>(
    pin: &mut PIN,
    delay: &mut DELAY,
    timing: TimingProfile,
) -> Result<(), DhtError<E>>
where
    PIN: OutputPin<Error = E>,
    DELAY: DelayNs,
{
    pin.set_low()?;
    delay.delay_ms(timing.start_low_ms);
    pin.set_high()?;
    delay.delay_us(START_HIGH_US);
    Ok(())
}

/// Performs one complete transaction and leaves the result in `frame`.
///
/// `frame` is written even when the transaction fails, so the pulse widths
/// of a corrupted transmission stay available for inspection.
pub(crate) fn transaction<PIN, DELAY, CLOCK, E>(
    pin: &mut PIN,
    delay: &mut DELAY,
    clock: &CLOCK,
    timing: TimingProfile,
    frame: &mut RawFrame,
) -> Result<(), DhtError<E>>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    *frame = RawFrame::default();
    send_start(pin, delay, timing)?;

    let mut line = Line::new(pin, clock, timing);
    // The sensor pulls the line low to acknowledge
    line.wait_while(PinState::High, timing.ack_timeout_us, DhtError::NoResponse)?;
    receive(&mut line, frame)
}

/// Finishes the acknowledgment once the sensor has pulled the line low, then
/// reads and verifies the payload.
pub(crate) fn receive<PIN, CLOCK, E>(
    line: &mut Line<'_, PIN, CLOCK>,
    frame: &mut RawFrame,
) -> Result<(), DhtError<E>>
where
    PIN: InputPin<Error = E>,
    CLOCK: Clock,
{
    let ack_timeout = line.timing().ack_timeout_us;
    line.wait_while(PinState::Low, ack_timeout, DhtError::AckTimeout)?; // 80us
    line.wait_while(PinState::High, ack_timeout, DhtError::AckTimeout)?; // 80us

    line.read_payload(frame)?;
    verify_checksum(frame)
}

pub(crate) fn verify_checksum<E>(frame: &RawFrame) -> Result<(), DhtError<E>> {
    if frame.is_checksum_valid() {
        Ok(())
    } else {
        Err(DhtError::ChecksumMismatch {
            expected: frame.checksum(),
            calculated: frame.calculated_checksum(),
        })
    }
}
