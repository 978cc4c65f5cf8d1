use crate::reading::Calibration;
use crate::variant::Variant;

/// Number of attempts per `read()` unless configured otherwise.
pub const DEFAULT_RETRIES: u8 = 3;

/// Construction options for [`Dht`](crate::Dht).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Sensor model, or `Auto` to detect it.
    pub variant: Variant,
    /// Attempts per `read()`; `0` behaves like `1`.
    pub retries: u8,
    pub calibration: Calibration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Variant::Auto,
            retries: DEFAULT_RETRIES,
            calibration: Calibration::default(),
        }
    }
}

impl Config {
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_temperature_offset(mut self, offset: f32) -> Self {
        self.calibration.temperature_offset = offset;
        self
    }

    pub fn with_humidity_offset(mut self, offset: f32) -> Self {
        self.calibration.humidity_offset = offset;
        self
    }
}
