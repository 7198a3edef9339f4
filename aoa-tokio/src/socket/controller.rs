use std::sync::Arc;

use aoa_core::{
    debug,
    stream::{Descriptor, Stream},
    trace, warn, Error, ErrorKind, Listener, Manager, Provider, SocketId, State,
};
use tokio::sync::{mpsc, watch};

use super::{
    receiver::{self, Receiver},
    sender::{self, Sender},
    Command, IoEvent,
};

type AccessoryOf<M> = <<M as Manager>::Provider as Provider>::Accessory;
type StreamOf<M> = <<M as Manager>::Provider as Provider>::Stream;
type DescriptorOf<M> = <StreamOf<M> as Stream>::Descriptor;

/// The single owner of a socket's state.
///
/// Commands from the socket handles and events from the I/O tasks are processed one at a time,
/// which makes every state transition (and in particular the one into `Error`) happen exactly once.
pub(super) struct Controller<M: Manager, L> {
    id: SocketId,
    manager: Arc<M>,
    accessory: Arc<AccessoryOf<M>>,
    listener: L,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<State>,
    events: mpsc::UnboundedReceiver<IoEvent>,
    // Handed to the I/O tasks. Keeping it here means `events` never closes.
    events_tx: mpsc::UnboundedSender<IoEvent>,
    session: Option<Session<DescriptorOf<M>>>,
}

impl<M, L> Controller<M, L>
where
    M: Manager,
    L: Listener,
{
    pub(super) fn new(
        id: SocketId,
        manager: Arc<M>,
        accessory: Arc<AccessoryOf<M>>,
        listener: L,
        commands: mpsc::UnboundedReceiver<Command>,
        state: watch::Sender<State>,
    ) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();

        Self {
            id,
            manager,
            accessory,
            listener,
            commands,
            state,
            events,
            events_tx,
            session: None,
        }
    }

    pub(super) async fn run(mut self) {
        let mut handles_alive = true;

        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                command = self.commands.recv(), if handles_alive => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("socket {}: all handles dropped", self.id);
                        handles_alive = false;
                        self.close();
                    }
                },
                else => break,
            }

            if !handles_alive && !self.is_busy() {
                break;
            }
        }
        trace!("socket {}: controller finished in {:?}", self.id, self.state());
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open => self.open().await,
            Command::Write(frame) => self.write(frame),
            Command::Close => self.close(),
            Command::Detach => self.fail(ErrorKind::Detached, None),
        }
    }

    fn handle_event(&mut self, event: IoEvent) {
        match event {
            IoEvent::Received(frame) => match self.state() {
                State::Open | State::Closing => {
                    trace!("socket {}: received frame: {:?}", self.id, frame);
                    self.listener.on_read(frame);
                }
                state => trace!(
                    "socket {}: dropping {} bytes received in state {:?}",
                    self.id,
                    frame.len(),
                    state
                ),
            },
            IoEvent::ReadFailed(e) | IoEvent::WriteFailed(e) => {
                self.fail(ErrorKind::TransportFault, Some(e))
            }
            IoEvent::ReceiverStopped => {
                // The receiver only stops on request, which only happens when closing. Anything
                // the sender still has queued (the close command included) goes out before it
                // acknowledges the shutdown.
                if self.state() == State::Closing {
                    if let Some(session) = &self.session {
                        session.sender.shutdown();
                    }
                }
            }
            IoEvent::SenderDrained => {
                if self.state() == State::Closing {
                    self.finish_close();
                }
            }
        }
    }

    async fn open(&mut self) {
        match self.state() {
            State::Idle => (),
            State::Open => {
                debug!("socket {}: already open", self.id);
                self.listener.on_open();
                return;
            }
            state => {
                warn!("socket {}: can't open in state {:?}", self.id, state);
                self.listener.on_error(ErrorKind::OpenFail);
                return;
            }
        }

        self.set_state(State::Opening);
        let res = self
            .manager
            .provide_manager()
            .open_accessory(&self.accessory)
            .await;
        let stream = match res {
            Ok(stream) => stream,
            Err(e) => {
                debug!(
                    "socket {}: failed to open accessory {:?}: {}",
                    self.id, self.accessory, e
                );
                self.set_state(State::Idle);
                self.listener.on_error(ErrorKind::OpenFail);
                return;
            }
        };

        let (read, write, descriptor) = stream.split();
        self.session = Some(Session {
            descriptor,
            receiver: Receiver::spawn(self.id, read, self.events_tx.clone()),
            sender: Sender::spawn(self.id, write, self.events_tx.clone()),
        });
        self.set_state(State::Open);
        debug!("socket {}: opened accessory {:?}", self.id, self.accessory);
        self.listener.on_open();
    }

    fn write(&mut self, frame: Vec<u8>) {
        match (&self.session, self.state()) {
            (Some(session), State::Open) => session.sender.send(frame),
            (_, state) => trace!(
                "socket {}: dropping {} byte write in state {:?}",
                self.id,
                frame.len(),
                state
            ),
        }
    }

    fn close(&mut self) {
        if self.state() != State::Open {
            trace!("socket {}: nothing to close in {:?}", self.id, self.state());
            return;
        }

        self.set_state(State::Closing);
        let close_command = self.listener.on_provide_close_command();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        debug!("socket {}: closing", self.id);
        session.receiver.stop();
        session.sender.send(close_command);
    }

    fn finish_close(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.release(self.id);
        self.manager.dispose_socket(self.id);
        // Observers of the terminal state can rely on the cleanup being done.
        self.set_state(State::Closed);
        debug!("socket {}: closed", self.id);
    }

    /// The one-shot error path.
    ///
    /// Only has an effect on an open or closing socket: once it ran, the socket is in `Error` and
    /// every later failure (typically the other half of the stream noticing the same problem) is
    /// ignored.
    fn fail(&mut self, kind: ErrorKind, error: Option<Error>) {
        match self.state() {
            State::Open | State::Closing => (),
            state => {
                trace!(
                    "socket {}: ignoring {} in state {:?} ({:?})",
                    self.id,
                    kind,
                    state,
                    error
                );
                return;
            }
        }
        match &error {
            Some(e) => debug!("socket {}: {}: {}", self.id, kind, e),
            None => debug!("socket {}: {}", self.id, kind),
        }

        if let Some(session) = self.session.take() {
            session.release(self.id);
        }
        self.manager.dispose_socket(self.id);
        self.set_state(State::Error);
        self.listener.on_error(kind);
    }

    fn state(&self) -> State {
        *self.state.borrow()
    }

    fn set_state(&self, state: State) {
        trace!("socket {}: {:?} -> {:?}", self.id, self.state(), state);
        self.state.send_replace(state);
    }

    /// Whether the socket still owns resources or is about to.
    fn is_busy(&self) -> bool {
        matches!(self.state(), State::Opening | State::Open | State::Closing)
    }
}

/// Everything acquired by a successful open.
struct Session<D> {
    descriptor: D,
    receiver: receiver::Handle,
    sender: sender::Handle,
}

impl<D> Session<D>
where
    D: Descriptor,
{
    /// Release the stream: both I/O tasks go away, taking their halves with them, and the
    /// descriptor is closed.
    ///
    /// Consuming `self` makes releasing twice impossible.
    fn release(self, id: SocketId) {
        self.receiver.abort();
        self.sender.abort();
        if let Err(e) = self.descriptor.close() {
            warn!("socket {}: failed to release descriptor: {}", id, e);
        }
        trace!("socket {}: stream released", id);
    }
}
