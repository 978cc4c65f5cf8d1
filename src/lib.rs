//! DHT11 / DHT22 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT11 and DHT22 (AM2302)
//! temperature and humidity sensors, built on top of the [`embedded-hal`] traits.
//!
//! # Features
//! - Blocking reads with retries, back-off and a plausibility check
//! - Non-blocking reads driven from a main loop
//!   ([`Dht::start_async_read`] / [`Dht::process_async`])
//! - Automatic detection of the sensor model
//! - Calibration offsets, dew point and heat index, Celsius / Fahrenheit / Kelvin
//! - Last-known-good fallback and consecutive failure tracking
//! - Designed for `no_std` environments
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access (open-drain with pull-up)
//! - [`DelayNs`] for blocking waits
//!
//! plus a microsecond counter implementing [`Clock`] for measuring pulse widths.
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for public types and logs through `defmt`
//! - `log`: Logs through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! let mut dht = Dht::new(pin, delay, timer);
//! dht.begin()?;
//! match dht.read() {
//!     Ok(reading) => { /* reading.temperature, reading.relative_humidity */ }
//!     Err(err) => { /* dht.data() still holds the last good reading */ }
//! }
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
mod decoder;
mod detect;
pub mod dht;
pub mod error;
pub mod frame;
pub mod nonblocking;
mod protocol;
pub mod reading;
pub mod units;
pub mod variant;

#[cfg(test)]
mod sim;

pub use clock::Clock;
pub use config::Config;
pub use dht::Dht;
pub use error::{DhtError, ErrorKind};
pub use frame::RawFrame;
pub use nonblocking::Callback;
pub use reading::{Calibration, Reading};
pub use units::TempUnit;
pub use variant::{TimingProfile, Variant};
