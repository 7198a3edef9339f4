#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub, clippy::std_instead_of_core)]
#![doc = include_str!("../README.md")]

#[doc(hidden)]
#[macro_use]
pub mod log;

mod error;
pub use error::{Error, ErrorKind, Result};
mod listener;
pub use listener::Listener;
mod manager;
pub use manager::{Manager, Provider, SocketId};
mod state;
pub use state::State;
pub mod stream;
pub use stream::Stream;
