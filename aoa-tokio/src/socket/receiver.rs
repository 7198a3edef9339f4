use aoa_core::{
    debug,
    stream::{ReadHalf, READ_BUFFER_SIZE},
    trace, Error, SocketId,
};
use tokio::{
    sync::{
        mpsc,
        oneshot::{self, error::TryRecvError},
    },
    task::JoinHandle,
};

use super::IoEvent;

/// The receive loop, reading the stream until told to stop or until it fails.
#[derive(Debug)]
pub(super) struct Receiver<R> {
    id: SocketId,
    read: R,
    stop: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<IoEvent>,
}

impl<R> Receiver<R>
where
    R: ReadHalf,
{
    /// Start receiving from `read` in a new task.
    pub(super) fn spawn(id: SocketId, read: R, events: mpsc::UnboundedSender<IoEvent>) -> Handle {
        let (stop_tx, stop) = oneshot::channel();
        let receiver = Self {
            id,
            read,
            stop,
            events,
        };

        Handle {
            stop: Some(stop_tx),
            task: tokio::spawn(receiver.run()),
        }
    }

    async fn run(mut self) {
        let mut buffer = vec![0; READ_BUFFER_SIZE];

        // A stop request doesn't interrupt a pending read, it's only checked before the next one.
        while !self.stop_requested() {
            match self.read.read(&mut buffer).await {
                Ok(Some(len)) => {
                    trace!("socket {}: read {} bytes", self.id, len);
                    // Copy out so the frame outlives the next read into `buffer`.
                    self.report(IoEvent::Received(buffer[..len].to_vec()));
                }
                Ok(None) => {
                    debug!("socket {}: end of stream", self.id);
                    self.report(IoEvent::ReadFailed(Error::UnexpectedEof));
                    return;
                }
                Err(e) => {
                    self.report(IoEvent::ReadFailed(e));
                    return;
                }
            }
        }

        debug!("socket {}: receiver stopped", self.id);
        self.report(IoEvent::ReceiverStopped);
    }

    fn stop_requested(&mut self) -> bool {
        // A dropped stop sender means the socket is going away without us.
        !matches!(self.stop.try_recv(), Err(TryRecvError::Empty))
    }

    fn report(&self, event: IoEvent) {
        // Failure means the controller is gone and no one cares anymore.
        let _ = self.events.send(event);
    }
}

/// The controller's end of a [`Receiver`].
#[derive(Debug)]
pub(super) struct Handle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Handle {
    /// Ask the receiver to stop once its pending read returns.
    pub(super) fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Stop the receiver right away, dropping the read half with any read in flight.
    pub(super) fn abort(&self) {
        self.task.abort();
    }
}
