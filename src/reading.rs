use crate::error::ErrorKind;
use crate::units::{self, TempUnit};
use crate::variant::Variant;

/// Measurement produced by the sensor, with values in °C and %RH.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent, always within 0..=100.
    pub relative_humidity: f32,
    /// Dew point in degrees Celsius.
    pub dew_point: f32,
    /// Heat index in degrees Celsius.
    pub heat_index: f32,
    /// `None` for a fresh, valid reading; otherwise the error of the
    /// acquisition this reading stands in for.
    pub status: Option<ErrorKind>,
}

impl Reading {
    /// Builds a reading from decoded values, applying calibration and humidity clamping.
    pub fn new(temperature: f32, relative_humidity: f32, calibration: Calibration) -> Self {
        let temperature = temperature + calibration.temperature_offset;
        let relative_humidity = (relative_humidity + calibration.humidity_offset).clamp(0.0, 100.0);

        Reading {
            temperature,
            relative_humidity,
            dew_point: units::dew_point(temperature, relative_humidity),
            heat_index: units::heat_index(temperature, relative_humidity),
            status: None,
        }
    }

    /// Reading with no usable values.
    pub fn invalid(status: ErrorKind) -> Self {
        Reading {
            temperature: f32::NAN,
            relative_humidity: f32::NAN,
            dew_point: f32::NAN,
            heat_index: f32::NAN,
            status: Some(status),
        }
    }

    /// Same values, different status.
    pub fn with_status(self, status: Option<ErrorKind>) -> Self {
        Reading { status, ..self }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_none()
    }

    pub fn temperature_in(&self, unit: TempUnit) -> f32 {
        unit.from_celsius(self.temperature)
    }

    pub fn dew_point_in(&self, unit: TempUnit) -> f32 {
        unit.from_celsius(self.dew_point)
    }

    pub fn heat_index_in(&self, unit: TempUnit) -> f32 {
        unit.from_celsius(self.heat_index)
    }

    /// Plausibility check against the physical operating range of `variant`.
    ///
    /// This filters out obviously corrupted values; it says nothing about accuracy.
    pub fn is_plausible(&self, variant: Variant) -> bool {
        !self.temperature.is_nan()
            && !self.relative_humidity.is_nan()
            && (0.0..=100.0).contains(&self.relative_humidity)
            && variant.temperature_range().contains(&self.temperature)
    }
}

/// Additive offsets applied to every decoded value.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Calibration {
    /// Added to the temperature, in °C.
    pub temperature_offset: f32,
    /// Added to the relative humidity, in %.
    pub humidity_offset: f32,
}
