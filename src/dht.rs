use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::clock::Clock;
use crate::config::Config;
use crate::detect;
use crate::error::{DhtError, ErrorKind};
use crate::frame::RawFrame;
use crate::nonblocking::{AsyncState, Callback};
use crate::protocol;
use crate::reading::{Calibration, Reading};
use crate::units::TempUnit;
use crate::variant::Variant;

/// Consecutive failures after which [`Dht::is_connected`] reports `false`.
pub const FAILURE_THRESHOLD: u16 = 5;

/// Time the sensor needs after power-up before it answers reliably.
pub const POWER_ON_DELAY_MS: u32 = 1000;

/// Driver for a DHT11 or DHT22 temperature and humidity sensor.
///
/// The data pin must be open-drain with a pull-up: `set_low` pulls the line
/// down, `set_high` releases it so the sensor can drive it.
pub struct Dht<PIN, DELAY, CLOCK> {
    pub(crate) pin: PIN,
    pub(crate) delay: DELAY,
    pub(crate) clock: CLOCK,
    pub(crate) variant: Variant,
    retries: u8,
    calibration: Calibration,
    /// Scratch buffer of the most recent transaction, valid or not.
    pub(crate) raw: RawFrame,
    /// Data bytes of the most recent checksum-valid frame.
    decoded: Option<[u8; 4]>,
    last_good: Option<Reading>,
    last_error: Option<ErrorKind>,
    failures: u16,
    pub(crate) last_acquisition_us: Option<u32>,
    pub(crate) test_mode: bool,
    injected: Option<[u8; 5]>,
    pub(crate) async_state: AsyncState,
    pub(crate) callback: Option<Callback>,
}

impl<PIN, DELAY, CLOCK, E> Dht<PIN, DELAY, CLOCK>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    /// Creates a driver with the default [`Config`]: auto-detected model, 3 attempts per read.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the data line. Must support both input and output.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - A free-running microsecond counter used to measure pulse widths.
    pub fn new(pin: PIN, delay: DELAY, clock: CLOCK) -> Self {
        Self::with_config(pin, delay, clock, Config::default())
    }

    pub fn with_config(pin: PIN, delay: DELAY, clock: CLOCK, config: Config) -> Self {
        Dht {
            pin,
            delay,
            clock,
            variant: config.variant,
            retries: config.retries,
            calibration: config.calibration,
            raw: RawFrame::default(),
            decoded: None,
            last_good: None,
            last_error: None,
            failures: 0,
            last_acquisition_us: None,
            test_mode: false,
            injected: None,
            async_state: AsyncState::Idle,
            callback: None,
        }
    }

    /// Gives back the pin, delay and clock.
    pub fn release(self) -> (PIN, DELAY, CLOCK) {
        (self.pin, self.delay, self.clock)
    }

    /// Releases the line, waits for the sensor to power up and detects the
    /// model if it is not known yet.
    ///
    /// Blocks for at least [`POWER_ON_DELAY_MS`]. Returns the model in use,
    /// which is still [`Variant::Auto`] if detection failed; `read()` will
    /// then try again. A plausible frame received during detection becomes
    /// the first reading, available through [`Dht::data`] and
    /// [`Dht::read_throttled`].
    pub fn begin(&mut self) -> Result<Variant, DhtError<E>> {
        self.pin.set_high()?;
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        if self.variant == Variant::Auto && !self.test_mode && self.detect()? {
            if let Ok(reading) = self.evaluate() {
                self.record_success(reading);
            }
        }
        Ok(self.variant)
    }

    /// Runs detection; on success the checksum-valid frame it received is left in `raw`.
    fn detect(&mut self) -> Result<bool, DhtError<E>> {
        let detected = detect::detect(&mut self.pin, &mut self.delay, &self.clock, &mut self.raw)?;
        let Some(variant) = detected else {
            return Ok(false);
        };

        self.variant = variant;
        self.last_acquisition_us = Some(self.clock.now_us());
        Ok(true)
    }

    /// Reads a temperature and humidity measurement from the sensor.
    ///
    /// Runs up to `retries` complete transactions, pausing between them,
    /// until one yields a frame with a valid checksum and plausible values.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` with the fresh measurement.
    /// * `Err(DhtError)` with the error of the last attempt. [`Dht::data`]
    ///   then still returns the last good reading, tagged with this error.
    pub fn read(&mut self) -> Result<Reading, DhtError<E>> {
        let result = self.acquire();
        self.last_acquisition_us = Some(self.clock.now_us());

        match result {
            Ok(reading) => {
                self.record_success(reading);
                Ok(reading)
            }
            Err(err) => {
                self.record_failure(err.kind());
                Err(err)
            }
        }
    }

    /// Like [`Dht::read`], but returns the cached reading while the sensor's
    /// minimum interval since the previous acquisition has not elapsed.
    pub fn read_throttled(&mut self) -> Result<Reading, DhtError<E>> {
        let cached = (self.last_acquisition_us, self.last_good, self.last_error);
        if let (Some(at), Some(good), None) = cached {
            let interval_us = self.min_read_interval_ms().saturating_mul(1000);
            if self.clock.elapsed_us(at) < interval_us {
                return Ok(good);
            }
        }
        self.read()
    }

    fn acquire(&mut self) -> Result<Reading, DhtError<E>> {
        let attempts = self.retries.max(1);
        let mut first_attempt = 0;
        let mut last_err = DhtError::Internal;

        if self.variant == Variant::Auto && !self.test_mode {
            if !self.detect()? {
                return Err(DhtError::NoResponse);
            }
            // The detection frame is the first attempt
            match self.evaluate() {
                Ok(reading) => return Ok(reading),
                Err(err) => {
                    last_err = err;
                    first_attempt = 1;
                }
            }
        }

        for attempt in first_attempt..attempts {
            if attempt > 0 {
                self.delay.delay_ms(self.variant.retry_backoff_ms());
            }

            match self.fetch_frame().and_then(|()| self.evaluate()) {
                Ok(reading) => return Ok(reading),
                Err(DhtError::PinError(err)) => return Err(DhtError::PinError(err)),
                Err(err) => {
                    debug!("attempt {} of {} failed: {}", attempt + 1, attempts, err.kind());
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }

    /// Fills `raw` with a checksum-verified frame, from the line or from the injected test frame.
    pub(crate) fn fetch_frame(&mut self) -> Result<(), DhtError<E>> {
        if self.test_mode {
            let bytes = self.injected.ok_or(DhtError::NoResponse)?;
            self.raw = RawFrame::from_bytes(bytes);
            return protocol::verify_checksum(&self.raw);
        }

        protocol::transaction(
            &mut self.pin,
            &mut self.delay,
            &self.clock,
            self.variant.timing(),
            &mut self.raw,
        )
    }

    /// Decodes the checksum-valid frame in `raw` and runs the sanity check.
    pub(crate) fn evaluate(&mut self) -> Result<Reading, DhtError<E>> {
        let data = self.raw.data();
        self.decoded = Some(data);

        let reading = self.decode(data);
        if reading.is_plausible(self.variant.resolve(data)) {
            Ok(reading)
        } else {
            warn!(
                "implausible reading: {} C, {} %",
                reading.temperature, reading.relative_humidity
            );
            Err(DhtError::SanityCheck)
        }
    }

    fn decode(&self, data: [u8; 4]) -> Reading {
        let (temperature, humidity) = self.variant.decode(data);
        Reading::new(temperature, humidity, self.calibration)
    }

    pub(crate) fn record_success(&mut self, reading: Reading) {
        trace!("reading {} C, {} %", reading.temperature, reading.relative_humidity);
        self.last_good = Some(reading);
        self.last_error = None;
        self.failures = 0;
    }

    pub(crate) fn record_failure(&mut self, kind: ErrorKind) {
        self.last_error = Some(kind);
        self.failures = self.failures.saturating_add(1);
        warn!("read failed: {} ({} consecutive)", kind, self.failures);
    }

    /// The last good reading tagged with the current status.
    ///
    /// After a failed read this is the previous good reading carrying the
    /// error, or NaN values if there never was a good reading.
    pub fn data(&self) -> Reading {
        match self.last_good {
            Some(good) => good.with_status(self.last_error),
            None => Reading::invalid(self.last_error.unwrap_or(ErrorKind::NoResponse)),
        }
    }

    /// Reading recomputed from the last checksum-valid frame with the current offsets.
    fn decoded_reading(&self) -> Option<Reading> {
        self.decoded.map(|data| self.decode(data))
    }

    /// Temperature of the last decoded frame, NaN if nothing was decoded yet.
    pub fn temperature(&self, unit: TempUnit) -> f32 {
        self.decoded_reading()
            .map_or(f32::NAN, |reading| reading.temperature_in(unit))
    }

    /// Relative humidity of the last decoded frame, NaN if nothing was decoded yet.
    pub fn humidity(&self) -> f32 {
        self.decoded_reading()
            .map_or(f32::NAN, |reading| reading.relative_humidity)
    }

    pub fn dew_point(&self, unit: TempUnit) -> f32 {
        self.decoded_reading()
            .map_or(f32::NAN, |reading| reading.dew_point_in(unit))
    }

    pub fn heat_index(&self, unit: TempUnit) -> f32 {
        self.decoded_reading()
            .map_or(f32::NAN, |reading| reading.heat_index_in(unit))
    }

    /// Bytes and pulse widths of the most recent transaction.
    pub fn raw_frame(&self) -> &RawFrame {
        &self.raw
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Sets the number of attempts per `read()`; `0` behaves like `1`.
    pub fn set_retries(&mut self, retries: u8) {
        self.retries = retries;
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn set_temperature_offset(&mut self, offset: f32) {
        self.calibration.temperature_offset = offset;
    }

    pub fn set_humidity_offset(&mut self, offset: f32) {
        self.calibration.humidity_offset = offset;
    }

    /// Minimum time between two acquisitions for the current model.
    pub fn min_read_interval_ms(&self) -> u32 {
        self.variant.min_read_interval_ms()
    }

    /// Error of the last read, `None` if it succeeded.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Number of reads that failed since the last successful one.
    pub fn failure_count(&self) -> u16 {
        self.failures
    }

    /// `false` once [`FAILURE_THRESHOLD`] reads in a row have failed.
    pub fn is_connected(&self) -> bool {
        self.failures < FAILURE_THRESHOLD
    }

    /// In test mode reads take the injected frame instead of talking to the sensor.
    pub fn set_test_mode(&mut self, enabled: bool) {
        self.test_mode = enabled;
        if !enabled {
            self.injected = None;
        }
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    /// Sets the frame every subsequent read receives. Ignored unless test mode is on.
    ///
    /// Returns whether the frame was accepted.
    pub fn inject_frame(&mut self, bytes: [u8; 5]) -> bool {
        if self.test_mode {
            self.injected = Some(bytes);
        }
        self.test_mode
    }
}
