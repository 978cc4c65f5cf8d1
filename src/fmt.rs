//! Logging shims routed to `defmt` or `log`, or compiled out when neither feature is enabled.
//!
//! Format strings must stick to plain `{}` placeholders so they are valid for both backends.
//! With both features enabled `defmt` takes precedence. Test builds never log
//! through `defmt`, since there is no global logger to link against.

#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(all(feature = "defmt", not(test)))]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(all(feature = "log", any(test, not(feature = "defmt"))))]
        ::log::trace!($s $(, $x)*);
        #[cfg(not(any(all(feature = "defmt", not(test)), feature = "log")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(all(feature = "defmt", not(test)))]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(all(feature = "log", any(test, not(feature = "defmt"))))]
        ::log::debug!($s $(, $x)*);
        #[cfg(not(any(all(feature = "defmt", not(test)), feature = "log")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(all(feature = "defmt", not(test)))]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(all(feature = "log", any(test, not(feature = "defmt"))))]
        ::log::warn!($s $(, $x)*);
        #[cfg(not(any(all(feature = "defmt", not(test)), feature = "log")))]
        let _ = ($( & $x ),*);
    }};
}
