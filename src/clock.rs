/// A free-running microsecond counter.
///
/// The counter is allowed to wrap; the driver only ever looks at differences
/// computed with wrapping subtraction, so intervals up to `u32::MAX` µs
/// (a little over 71 minutes) are measured correctly across the wrap.
pub trait Clock {
    /// Microseconds since some fixed point, normally boot.
    fn now_us(&self) -> u32;

    /// Microseconds elapsed since `earlier`, a value previously returned by [`Clock::now_us`].
    fn elapsed_us(&self, earlier: u32) -> u32 {
        self.now_us().wrapping_sub(earlier)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}
