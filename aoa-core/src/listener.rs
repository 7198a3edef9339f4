//! The consumer side of a socket.

use crate::ErrorKind;

/// The receiver of socket notifications.
///
/// All methods are called from the task driving the socket, one at a time and in the order the
/// underlying events happened. Implementations should return quickly: the socket does not process
/// anything else while a method runs.
pub trait Listener: Send + 'static {
    /// The socket is open.
    ///
    /// Called on every successful `open`, including redundant ones on an already open socket.
    fn on_open(&mut self);

    /// A frame arrived.
    ///
    /// The frame is owned by the listener and can be kept indefinitely. Empty frames are valid.
    fn on_read(&mut self, frame: Vec<u8>);

    /// The session ended because of `kind`.
    fn on_error(&mut self, kind: ErrorKind);

    /// Provide the frame that is sent to the peer as the last action of a graceful close.
    fn on_provide_close_command(&mut self) -> Vec<u8>;
}

impl<L> Listener for Box<L>
where
    L: Listener + ?Sized,
{
    fn on_open(&mut self) {
        (**self).on_open()
    }

    fn on_read(&mut self, frame: Vec<u8>) {
        (**self).on_read(frame)
    }

    fn on_error(&mut self, kind: ErrorKind) {
        (**self).on_error(kind)
    }

    fn on_provide_close_command(&mut self) -> Vec<u8> {
        (**self).on_provide_close_command()
    }
}
