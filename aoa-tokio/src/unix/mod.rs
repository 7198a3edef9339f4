//! Provides the stream over a Unix file descriptor.
//!
//! Platforms hand out an opened accessory as a file descriptor. Reads on it block until the
//! accessory sends something, so they run on Tokio's blocking pool.

mod stream;
pub use stream::{Descriptor, ReadHalf, Stream, WriteHalf};
