//! The platform side of a socket: acquiring descriptors and forgetting sockets.

use core::{
    fmt::{self, Debug, Display},
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{stream::Stream, Result};

/// Turns an accessory identifier into a stream.
pub trait Provider: Send + Sync + 'static {
    /// The accessory identifier. The socket never looks inside it.
    type Accessory: Debug + Send + Sync + 'static;
    /// The stream handed out for an accessory.
    type Stream: Stream;

    /// Open the accessory.
    ///
    /// Failure is reported to the listener as [`crate::ErrorKind::OpenFail`].
    fn open_accessory(
        &self,
        accessory: &Self::Accessory,
    ) -> impl Future<Output = Result<Self::Stream>> + Send;
}

/// The registry that sockets are created from.
pub trait Manager: Send + Sync + 'static {
    /// The provider of accessory streams.
    type Provider: Provider;

    /// The object capable of turning an accessory identifier into a stream.
    fn provide_manager(&self) -> &Self::Provider;

    /// Forget the socket `socket`.
    ///
    /// Called exactly once per socket, when it ends up closed or in error.
    fn dispose_socket(&self, socket: SocketId);
}

/// The unique identifier of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SocketId(usize);

impl SocketId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric value of the identifier.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
