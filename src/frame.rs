/// Number of data bits in one transmission.
pub const FRAME_BITS: usize = 40;

/// The five bytes of one transmission plus the pulse widths they were decoded from.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Humidity high, humidity low, temperature high, temperature low, checksum.
    pub bytes: [u8; 5],
    /// Duration of the high pulse of each bit, in µs.
    pub high_us: [u16; FRAME_BITS],
    /// Duration of the low pulse preceding each bit, in µs.
    pub low_us: [u16; FRAME_BITS],
}

impl Default for RawFrame {
    fn default() -> Self {
        Self {
            bytes: [0; 5],
            high_us: [0; FRAME_BITS],
            low_us: [0; FRAME_BITS],
        }
    }
}

impl RawFrame {
    /// Frame without recorded pulse widths.
    pub fn from_bytes(bytes: [u8; 5]) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }

    /// The four data bytes, without the checksum.
    pub fn data(&self) -> [u8; 4] {
        let [b0, b1, b2, b3, _] = self.bytes;
        [b0, b1, b2, b3]
    }

    /// Checksum byte as transmitted by the sensor.
    pub fn checksum(&self) -> u8 {
        self.bytes[4]
    }

    /// Low byte of the sum of the four data bytes.
    pub fn calculated_checksum(&self) -> u8 {
        self.data().iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    pub fn is_checksum_valid(&self) -> bool {
        self.checksum() == self.calculated_checksum()
    }
}
