//! Logging macros, forwarded to the `log` facade.
//!
//! Every component prefixes its messages with its own name in brackets, e.g.
//! `info!("[{}] Vehicle armed", ID)`, so a single `RUST_LOG` filter on the
//! crate shows which part of the loop is talking.

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { ::log::trace!($($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { ::log::debug!($($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { ::log::info!($($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { ::log::warn!($($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { ::log::error!($($arg)+) };
}
