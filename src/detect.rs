use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::clock::Clock;
use crate::error::DhtError;
use crate::frame::RawFrame;
use crate::protocol;
use crate::variant::{DHT11_TIMING, DHT22_TIMING, TimingProfile, Variant};

/// Rounds of (DHT22 probe, DHT11 probe) before giving up.
pub(crate) const DETECT_ATTEMPTS: u8 = 3;
/// Pause between two probes.
pub(crate) const DETECT_RETRY_DELAY_MS: u32 = 100;

/// Figures out which model is on the line by probing with each timing profile.
///
/// The DHT22 profile goes first: its short start pulse is ignored by DHT11
/// parts, so a checksum-valid answer to it means a DHT22. Otherwise the
/// DHT11 profile is tried. Returns `None` when no probe produced a valid
/// frame; the successful frame, if any, is left in `frame`.
pub(crate) fn detect<PIN, DELAY, CLOCK, E>(
    pin: &mut PIN,
    delay: &mut DELAY,
    clock: &CLOCK,
    frame: &mut RawFrame,
) -> Result<Option<Variant>, DhtError<E>>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    for attempt in 0..DETECT_ATTEMPTS {
        if attempt > 0 {
            delay.delay_ms(DETECT_RETRY_DELAY_MS);
        }

        if probe(pin, delay, clock, DHT22_TIMING, frame)? {
            debug!("detected DHT22");
            return Ok(Some(Variant::Dht22));
        }

        delay.delay_ms(DETECT_RETRY_DELAY_MS);

        if probe(pin, delay, clock, DHT11_TIMING, frame)? {
            debug!("detected DHT11");
            return Ok(Some(Variant::Dht11));
        }
    }

    warn!("sensor type detection failed after {} attempts", DETECT_ATTEMPTS);
    Ok(None)
}

/// One transaction; protocol failures are an answer ("not this profile"), pin errors are not.
fn probe<PIN, DELAY, CLOCK, E>(
    pin: &mut PIN,
    delay: &mut DELAY,
    clock: &CLOCK,
    timing: TimingProfile,
    frame: &mut RawFrame,
) -> Result<bool, DhtError<E>>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    match protocol::transaction(pin, delay, clock, timing, frame) {
        Ok(()) => Ok(true),
        Err(DhtError::PinError(err)) => Err(DhtError::PinError(err)),
        Err(err) => {
            trace!("probe with {} ms start pulse failed: {}", timing.start_low_ms, err.kind());
            Ok(false)
        }
    }
}
