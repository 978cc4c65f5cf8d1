//! Temperature units and the quantities derived from temperature and humidity.

/// Unit a temperature is reported in. Readings are stored in Celsius.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TempUnit {
    /// Converts a Celsius value into this unit.
    pub fn from_celsius(self, celsius: f32) -> f32 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
            TempUnit::Kelvin => celsius + 273.15,
        }
    }

    /// Converts a value in this unit into Celsius.
    pub fn to_celsius(self, value: f32) -> f32 {
        match self {
            TempUnit::Celsius => value,
            TempUnit::Fahrenheit => fahrenheit_to_celsius(value),
            TempUnit::Kelvin => value - 273.15,
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Dew point in °C using the Magnus approximation.
pub fn dew_point(temperature: f32, relative_humidity: f32) -> f32 {
    const A: f32 = 17.27;
    const B: f32 = 237.7;

    let alpha = (A * temperature) / (B + temperature) + libm::logf(relative_humidity / 100.0);
    (B * alpha) / (A - alpha)
}

/// Heat index (apparent temperature) in °C.
///
/// Computed in Fahrenheit with the simple NWS approximation; from 80 °F
/// upwards the Rothfusz regression replaces it.
pub fn heat_index(temperature: f32, relative_humidity: f32) -> f32 {
    fahrenheit_to_celsius(heat_index_fahrenheit(
        celsius_to_fahrenheit(temperature),
        relative_humidity,
    ))
}

pub(crate) fn heat_index_fahrenheit(t: f32, rh: f32) -> f32 {
    let simple = simple_heat_index(t, rh);
    if simple >= 80.0 { rothfusz(t, rh) } else { simple }
}

fn simple_heat_index(t: f32, rh: f32) -> f32 {
    0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094)
}

fn rothfusz(t: f32, rh: f32) -> f32 {
    -42.379 + 2.049_015_2 * t + 10.143_331 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "{actual} is not within {tolerance} of {expected}"
        );
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(TempUnit::Fahrenheit.from_celsius(100.0), 212.0);
        assert_eq!(TempUnit::Fahrenheit.from_celsius(-40.0), -40.0);
        assert_close(TempUnit::Kelvin.from_celsius(24.0), 297.15, 1e-3);
        assert_close(TempUnit::Fahrenheit.to_celsius(77.0), 25.0, 1e-4);
        assert_close(TempUnit::Kelvin.to_celsius(273.15), 0.0, 1e-4);
    }

    #[test]
    fn test_dew_point() {
        // saturated air: dew point equals temperature
        assert_close(dew_point(20.0, 100.0), 20.0, 1e-3);
        assert_close(dew_point(24.0, 50.0), 12.93, 0.05);
    }

    #[test]
    fn test_heat_index_below_threshold_uses_simple_formula() {
        // 70 °F, 50 %: simple formula gives 69.05 °F
        assert_close(heat_index_fahrenheit(70.0, 50.0), 69.05, 1e-3);
    }

    #[test]
    fn test_heat_index_switches_at_80() {
        // 83 °F dry air: simple formula gives 81.0
        assert!(simple_heat_index(83.0, 0.0) >= 80.0);
        assert_eq!(heat_index_fahrenheit(83.0, 0.0), rothfusz(83.0, 0.0));

        // 81 °F dry air: simple formula gives 78.8
        assert!(simple_heat_index(81.0, 0.0) < 80.0);
        assert_eq!(heat_index_fahrenheit(81.0, 0.0), simple_heat_index(81.0, 0.0));
    }

    #[test]
    fn test_heat_index_exactly_80_uses_regression() {
        // At 80 °F the simple formula reaches 80.0 near 48.94 % humidity;
        // walk the f32 grid until it is hit exactly.
        let t = 80.0f32;
        let mut rh = 48.9f32;
        while simple_heat_index(t, rh) != 80.0 {
            assert!(rh < 49.0);
            rh = f32::from_bits(rh.to_bits() + 1);
        }
        assert_eq!(heat_index_fahrenheit(t, rh), rothfusz(t, rh));
        assert_ne!(rothfusz(t, rh), 80.0);
    }

    #[test]
    fn test_heat_index_celsius() {
        // 32 °C (89.6 °F) at 70 % is about 40.4 °C
        assert_close(heat_index(32.0, 70.0), 40.4, 0.1);
    }
}
