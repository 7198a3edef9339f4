//! The accessory socket.

mod controller;
mod receiver;
mod sender;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use aoa_core::{trace, Error, Listener, Manager, Provider, SocketId, State};
use futures_util::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;

use controller::Controller;

/// A socket over a USB accessory stream.
///
/// The socket itself is a cheap handle: every operation is a message to a task that owns the
/// stream and drives the [`Listener`]. Operations never block and never fail; their outcome is
/// reported to the listener. Messages are processed in the order they were sent, so a `write`
/// issued right after `open` is sent as soon as the socket is open.
///
/// Clones share the same underlying socket. When the last handle is dropped while the socket is
/// open, it is closed gracefully.
#[derive(Debug)]
pub struct Socket<A> {
    id: SocketId,
    accessory: Arc<A>,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<State>,
    pending_permission: Arc<AtomicBool>,
}

impl<A> Socket<A>
where
    A: core::fmt::Debug + Send + Sync + 'static,
{
    /// Create a socket for `accessory`.
    ///
    /// The socket starts out idle; call [`Socket::open`] to acquire the stream from `manager`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new<M, L>(manager: Arc<M>, accessory: A, listener: L) -> Self
    where
        M: Manager,
        M::Provider: Provider<Accessory = A>,
        L: Listener,
    {
        let id = SocketId::next();
        let accessory = Arc::new(accessory);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(State::Idle);
        let controller = Controller::new(
            id,
            manager,
            accessory.clone(),
            listener,
            command_rx,
            state_tx,
        );
        tokio::spawn(controller.run());

        Self {
            id,
            accessory,
            commands,
            state,
            pending_permission: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the socket.
    ///
    /// On success the listener's [`Listener::on_open`] is called, also when the socket already was
    /// open. On failure [`Listener::on_error`] gets [`aoa_core::ErrorKind::OpenFail`].
    pub fn open(&self) {
        self.send(Command::Open);
    }

    /// Queue `frame` for writing.
    ///
    /// Silently dropped unless the socket is open.
    pub fn write<F>(&self, frame: F)
    where
        F: Into<Vec<u8>>,
    {
        self.send(Command::Write(frame.into()));
    }

    /// Close the socket gracefully.
    ///
    /// The frame supplied by [`Listener::on_provide_close_command`] is sent as the last frame and
    /// the stream is released once it was written and the pending read returned. No-op unless the
    /// socket is open.
    pub fn close(&self) {
        self.send(Command::Close);
    }

    /// Tear the socket down because the accessory was detached.
    ///
    /// The listener gets [`aoa_core::ErrorKind::Detached`]. No-op unless the socket is open or
    /// closing.
    pub fn detach(&self) {
        self.send(Command::Detach);
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    /// The current state of the socket.
    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Wait until the socket is closed or failed, returning the final state.
    pub async fn terminated(&self) -> State {
        let mut state = self.state.clone();
        if let Ok(s) = state.wait_for(|s| s.is_terminal()).await {
            return *s;
        }

        // The socket task is gone, whatever it left behind is final.
        let last = *state.borrow();
        last
    }

    /// A stream of state changes, starting with the current state.
    ///
    /// Intermediate states might be skipped if they change faster than the stream is polled.
    pub fn state_stream(&self) -> impl Stream<Item = State> + Send + 'static {
        WatchStream::new(self.state.clone())
    }

    /// The unique identifier of the socket.
    #[inline]
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// The accessory this socket was created for.
    pub fn accessory(&self) -> &A {
        &self.accessory
    }

    /// Mark whether the platform is waiting for the user to grant access to the accessory.
    pub fn set_pending_permission(&self, pending: bool) {
        self.pending_permission.store(pending, Ordering::Release);
    }

    /// Whether the platform is waiting for the user to grant access to the accessory.
    pub fn is_pending_permission(&self) -> bool {
        self.pending_permission.load(Ordering::Acquire)
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            trace!("socket {}: socket task is gone, dropping command", self.id);
        }
    }
}

impl<A> Clone for Socket<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            accessory: self.accessory.clone(),
            commands: self.commands.clone(),
            state: self.state.clone(),
            pending_permission: self.pending_permission.clone(),
        }
    }
}

/// The operations a [`Socket`] handle asks the controller to perform.
#[derive(Debug)]
enum Command {
    Open,
    Write(Vec<u8>),
    Close,
    Detach,
}

/// What the I/O tasks report back to the controller.
#[derive(Debug)]
enum IoEvent {
    /// The receiver read a frame.
    Received(Vec<u8>),
    /// Reading failed. The receiver is gone.
    ReadFailed(Error),
    /// The receiver stopped on request.
    ReceiverStopped,
    /// Writing failed. The sender is gone.
    WriteFailed(Error),
    /// The sender wrote everything queued before its shutdown and stopped.
    SenderDrained,
}
