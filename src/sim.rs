//! Simulated sensor on the far end of the data line, used by the tests.
//!
//! Time only moves when the driver looks at the clock (1 µs per read) or
//! delays, so whole transactions run deterministically and instantly.

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::clock::Clock;

/// Delay between the host releasing the line and the sensor pulling it low.
const RESPONSE_DELAY_US: u32 = 20;
const ACK_LOW_US: u32 = 80;
const ACK_HIGH_US: u32 = 80;
const BIT_LOW_US: u32 = 50;
const ZERO_HIGH_US: u32 = 26;
const ONE_HIGH_US: u32 = 70;

/// Behaviour of the simulated sensor.
#[derive(Clone, Copy, Debug)]
pub struct Sensor {
    /// Frame sent on every request.
    pub frame: [u8; 5],
    /// Shortest start pulse the sensor reacts to.
    pub min_start_low_us: u32,
    /// Sensor present on the line at all.
    pub responsive: bool,
    /// Stop transmitting after this many bits, leaving the line floating high.
    pub stop_after_bits: Option<usize>,
    /// Start pulses within this long of the previous answer are ignored.
    pub min_interval_us: u32,
}

impl Sensor {
    /// A DHT22 that answers a 1 ms start pulse.
    pub fn dht22(frame: [u8; 5]) -> Self {
        Sensor {
            frame,
            min_start_low_us: 1_000,
            responsive: true,
            stop_after_bits: None,
            min_interval_us: 0,
        }
    }

    /// A DHT11 that needs at least 18 ms of start pulse.
    pub fn dht11(frame: [u8; 5]) -> Self {
        Sensor {
            min_start_low_us: 18_000,
            ..Self::dht22(frame)
        }
    }

    /// Same sensor, resting `us` between two answers like real parts do.
    pub fn with_min_interval_us(self, us: u32) -> Self {
        Sensor {
            min_interval_us: us,
            ..self
        }
    }

    pub fn silent() -> Self {
        Sensor {
            responsive: false,
            ..Self::dht22([0; 5])
        }
    }
}

struct Bus {
    now: u32,
    host_low_since: Option<u32>,
    response_at: Option<u32>,
    last_answer: Option<u32>,
    requests: u32,
    sensor: Sensor,
}

impl Bus {
    fn is_high(&self) -> bool {
        if self.host_low_since.is_some() {
            return false;
        }
        let Some(at) = self.response_at else {
            return true;
        };
        if self.now < at {
            return true;
        }

        let t = self.now - at;
        let mut edge = 0;
        let mut segment = |high: bool, duration: u32| {
            let hit = t < edge + duration;
            edge += duration;
            hit.then_some(high)
        };

        if let Some(level) = segment(false, ACK_LOW_US).or_else(|| segment(true, ACK_HIGH_US)) {
            return level;
        }
        for i in 0..40 {
            if self.sensor.stop_after_bits.is_some_and(|n| i >= n) {
                return true;
            }
            let bit = (self.sensor.frame[i / 8] >> (7 - i % 8)) & 1 == 1;
            let high = if bit { ONE_HIGH_US } else { ZERO_HIGH_US };
            if let Some(level) = segment(false, BIT_LOW_US).or_else(|| segment(true, high)) {
                return level;
            }
        }
        segment(false, BIT_LOW_US).unwrap_or(true)
    }
}

/// Handle to a simulated line; hands out pin, delay and clock views of it.
#[derive(Clone)]
pub struct SimLine(Rc<RefCell<Bus>>);

impl SimLine {
    pub fn new(sensor: Sensor) -> Self {
        SimLine(Rc::new(RefCell::new(Bus {
            now: 0,
            host_low_since: None,
            response_at: None,
            last_answer: None,
            requests: 0,
            sensor,
        })))
    }

    pub fn pin(&self) -> SimPin {
        SimPin(self.clone())
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.clone())
    }

    pub fn clock(&self) -> SimClock {
        SimClock(self.clone())
    }

    pub fn now(&self) -> u32 {
        self.0.borrow().now
    }

    pub fn advance_us(&self, us: u32) {
        self.0.borrow_mut().now += us;
    }

    /// Number of start pulses the sensor answered.
    pub fn requests(&self) -> u32 {
        self.0.borrow().requests
    }

    pub fn set_sensor(&self, sensor: Sensor) {
        self.0.borrow_mut().sensor = sensor;
    }

    pub fn is_high(&self) -> bool {
        self.0.borrow().is_high()
    }
}

pub struct SimPin(SimLine);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.is_high())
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.0.0.borrow_mut();
        bus.host_low_since = Some(bus.now);
        bus.response_at = None;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.0.0.borrow_mut();
        if let Some(since) = bus.host_low_since.take() {
            let now = bus.now;
            let min_interval = bus.sensor.min_interval_us;
            let rested = bus.last_answer.is_none_or(|at| now - at >= min_interval);
            if bus.sensor.responsive && now - since >= bus.sensor.min_start_low_us && rested {
                bus.response_at = Some(now + RESPONSE_DELAY_US);
                bus.last_answer = Some(now);
                bus.requests += 1;
            }
        }
        Ok(())
    }
}

pub struct SimDelay(SimLine);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance_us(ns.div_ceil(1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.advance_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.advance_us(ms * 1000);
    }
}

pub struct SimClock(SimLine);

impl Clock for SimClock {
    fn now_us(&self) -> u32 {
        let mut bus = self.0.0.borrow_mut();
        bus.now += 1;
        bus.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform() {
        let line = SimLine::new(Sensor::dht22([0x80, 0, 0, 0, 0x80]));
        let mut pin = line.pin();
        let mut delay = line.delay();

        assert!(line.is_high());
        pin.set_low().unwrap();
        assert!(!line.is_high());
        delay.delay_ms(2);
        pin.set_high().unwrap();
        assert_eq!(line.requests(), 1);

        // released, sensor not yet answering
        assert!(line.is_high());
        delay.delay_us(RESPONSE_DELAY_US);
        assert!(!line.is_high()); // ack low
        delay.delay_us(ACK_LOW_US);
        assert!(line.is_high()); // ack high
        delay.delay_us(ACK_HIGH_US + BIT_LOW_US);
        assert!(line.is_high()); // first bit is a one
        delay.delay_us(ONE_HIGH_US);
        assert!(!line.is_high()); // second bit low
    }

    #[test]
    fn test_short_start_pulse_ignored_by_dht11() {
        let line = SimLine::new(Sensor::dht11([0; 5]));
        let mut pin = line.pin();
        pin.set_low().unwrap();
        line.advance_us(2_000);
        pin.set_high().unwrap();
        assert_eq!(line.requests(), 0);
        line.advance_us(50);
        assert!(line.is_high());
    }

    #[test]
    fn test_start_pulse_ignored_while_resting() {
        let line = SimLine::new(Sensor::dht22([0; 5]).with_min_interval_us(2_000_000));
        let mut pin = line.pin();
        for _ in 0..2 {
            pin.set_low().unwrap();
            line.advance_us(2_000);
            pin.set_high().unwrap();
        }
        assert_eq!(line.requests(), 1);

        line.advance_us(2_000_000);
        pin.set_low().unwrap();
        line.advance_us(2_000);
        pin.set_high().unwrap();
        assert_eq!(line.requests(), 2);
    }
}
