//! Logging shims.
//!
//! The crate logs through `defmt` or `log`, whichever feature is enabled
//! (`defmt` wins if both are). With neither feature the macros only
//! evaluate their arguments by reference, so call sites stay warning free.
#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace {
            ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::trace!($s $(, $x)*) };
        }
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::debug!($s $(, $x)*) };
        }
        macro_rules! info {
            ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::info!($s $(, $x)*) };
        }
        macro_rules! warn {
            ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::warn!($s $(, $x)*) };
        }
        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::error!($s $(, $x)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($s:literal $(, $x:expr)* $(,)?) => { ::log::trace!($s $(, $x)*) };
        }
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => { ::log::debug!($s $(, $x)*) };
        }
        macro_rules! info {
            ($s:literal $(, $x:expr)* $(,)?) => { ::log::info!($s $(, $x)*) };
        }
        macro_rules! warn {
            ($s:literal $(, $x:expr)* $(,)?) => { ::log::warn!($s $(, $x)*) };
        }
        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => { ::log::error!($s $(, $x)*) };
        }
    } else {
        macro_rules! trace {
            ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }};
        }
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }};
        }
        macro_rules! info {
            ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }};
        }
        macro_rules! warn {
            ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }};
        }
        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }};
        }
    }
}
