#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]

pub use aoa_core::*;
pub mod events;
mod socket;
pub use socket::Socket;
#[cfg(unix)]
pub mod unix;

#[cfg(test)]
mod test_utils;
