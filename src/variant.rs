use core::fmt;
use core::ops::RangeInclusive;

/// Supported sensor models.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// Not known yet; resolved by detection.
    #[default]
    Auto,
    /// DHT11: 1 °C / 1 % resolution, integer + decimal byte encoding.
    Dht11,
    /// DHT22 / AM2302: 0.1 resolution, 16-bit fixed point with sign bit.
    Dht22,
}

/// Per-model protocol timings.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingProfile {
    /// How long the host holds the line low to request a reading.
    pub start_low_ms: u32,
    /// Upper bound for each of the three acknowledgment phases.
    pub ack_timeout_us: u32,
    /// Delay after releasing the line before the non-blocking reader samples the acknowledgment.
    pub ack_settle_us: u32,
    /// Upper bound for each level of a data bit.
    pub bit_timeout_us: u32,
    /// High pulses longer than this are a `1` bit.
    pub high_threshold_us: u32,
}

pub const DHT11_TIMING: TimingProfile = TimingProfile {
    start_low_ms: 20,
    ack_timeout_us: 1000,
    ack_settle_us: 40,
    bit_timeout_us: 120,
    high_threshold_us: 40,
};

pub const DHT22_TIMING: TimingProfile = TimingProfile {
    start_low_ms: 2,
    ack_timeout_us: 500,
    ack_settle_us: 20,
    bit_timeout_us: 100,
    high_threshold_us: 40,
};

impl Variant {
    /// Timing profile for this variant.
    ///
    /// `Auto` uses the DHT11 profile: its 20 ms start pulse wakes both models.
    pub const fn timing(self) -> TimingProfile {
        match self {
            Variant::Dht22 => DHT22_TIMING,
            Variant::Dht11 | Variant::Auto => DHT11_TIMING,
        }
    }

    /// Plausible temperature range in °C.
    pub const fn temperature_range(self) -> RangeInclusive<f32> {
        match self {
            Variant::Dht11 => 0.0..=50.0,
            Variant::Dht22 | Variant::Auto => -40.0..=80.0,
        }
    }

    /// Pause between two attempts of one `read()`.
    pub const fn retry_backoff_ms(self) -> u32 {
        match self {
            Variant::Dht22 => 50,
            Variant::Dht11 | Variant::Auto => 100,
        }
    }

    /// Minimum time the sensor needs between two acquisitions.
    pub const fn min_read_interval_ms(self) -> u32 {
        match self {
            Variant::Dht11 => 1000,
            Variant::Dht22 | Variant::Auto => 2000,
        }
    }

    /// The concrete variant used to interpret `data`.
    pub fn resolve(self, data: [u8; 4]) -> Variant {
        match self {
            Variant::Auto => classify(data),
            known => known,
        }
    }

    /// Converts the four data bytes into `(temperature °C, relative humidity %)`.
    ///
    /// `Auto` decodes with the variant guessed by [`classify`].
    pub fn decode(self, data: [u8; 4]) -> (f32, f32) {
        let [hum_hi, hum_lo, temp_hi, temp_lo] = data;

        match self {
            Variant::Dht11 => {
                let humidity = hum_hi as f32 + hum_lo as f32 / 10.0;
                let temperature = temp_hi as f32 + temp_lo as f32 / 10.0;
                (temperature, humidity)
            }
            Variant::Dht22 => {
                let relative_humidity = u16::from_be_bytes([hum_hi, hum_lo]) as f32 / 10.0;

                let is_temp_negative = (temp_hi >> 7) != 0;
                let temp_hi = temp_hi & 0b0111_1111;
                let mut temperature = u16::from_be_bytes([temp_hi, temp_lo]) as f32 / 10.0;
                if is_temp_negative {
                    temperature = -temperature;
                }
                (temperature, relative_humidity)
            }
            Variant::Auto => self.resolve(data).decode(data),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Auto => "auto",
            Variant::Dht11 => "DHT11",
            Variant::Dht22 => "DHT22",
        })
    }
}

/// Largest decimal byte a DHT11 frame is expected to carry.
const DHT11_MAX_DECIMAL: u8 = 5;

/// Guesses the model from the shape of a checksum-valid frame.
///
/// DHT11 frames carry small decimal bytes next to integer bytes that are
/// plausible humidity and temperature values on their own. This is a
/// best-effort refinement only; borderline DHT22 frames (for example
/// 25.6 °C at 0.x % humidity) look exactly like DHT11 frames.
pub fn classify(data: [u8; 4]) -> Variant {
    let [hum_int, hum_dec, temp_int, temp_dec] = data;

    let small_decimals = hum_dec <= DHT11_MAX_DECIMAL && temp_dec <= DHT11_MAX_DECIMAL;
    if small_decimals && hum_int <= 100 && temp_int <= 50 {
        Variant::Dht11
    } else {
        Variant::Dht22
    }
}
