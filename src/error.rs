use core::fmt;

/// Possible errors from the DHT driver.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The sensor never pulled the line low after the start signal.
    NoResponse,
    /// The sensor started but did not finish its acknowledgment in time.
    AckTimeout,
    /// One of the 40 payload bits did not arrive within its timing window.
    BitTimeout,
    /// Checksum did not match the received data.
    ChecksumMismatch {
        /// Checksum byte sent by the sensor.
        expected: u8,
        /// Low byte of the sum of the four data bytes.
        calculated: u8,
    },
    /// Frame decoded fine but the values are physically implausible.
    SanityCheck,
    /// Internal invariant violation.
    Internal,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E> DhtError<E> {
    /// Payload-free classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DhtError::NoResponse => ErrorKind::NoResponse,
            DhtError::AckTimeout => ErrorKind::AckTimeout,
            DhtError::BitTimeout => ErrorKind::BitTimeout,
            DhtError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            DhtError::SanityCheck => ErrorKind::SanityCheck,
            DhtError::Internal => ErrorKind::Internal,
            DhtError::PinError(_) => ErrorKind::Pin,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtError::ChecksumMismatch {
                expected,
                calculated,
            } => write!(
                f,
                "checksum mismatch (expected {expected:#04x}, calculated {calculated:#04x})"
            ),
            DhtError::PinError(err) => write!(f, "GPIO pin error: {err:?}"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DhtError<E> {}

/// Status attached to a [`Reading`](crate::Reading) and kept as the session's last error.
///
/// Unlike [`DhtError`] it carries no pin error payload, so it is `Copy` and
/// can be stored across reads.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NoResponse,
    AckTimeout,
    BitTimeout,
    ChecksumMismatch,
    SanityCheck,
    Pin,
    Internal,
}

impl ErrorKind {
    /// Human readable description.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NoResponse => "sensor did not respond to the start signal",
            ErrorKind::AckTimeout => "sensor acknowledgment timed out",
            ErrorKind::BitTimeout => "timed out while reading a data bit",
            ErrorKind::ChecksumMismatch => "checksum mismatch",
            ErrorKind::SanityCheck => "reading outside plausible physical range",
            ErrorKind::Pin => "GPIO pin error",
            ErrorKind::Internal => "internal driver error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
