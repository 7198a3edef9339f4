use aoa_core::{debug, stream::WriteHalf, trace, SocketId};
use tokio::{sync::mpsc, task::JoinHandle};

use super::IoEvent;

/// The send queue, writing frames to the stream in the order they were queued.
#[derive(Debug)]
pub(super) struct Sender<W> {
    id: SocketId,
    write: W,
    queue: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<IoEvent>,
}

impl<W> Sender<W>
where
    W: WriteHalf,
{
    /// Start sending to `write` from a new task.
    pub(super) fn spawn(
        id: SocketId,
        write: W,
        events: mpsc::UnboundedSender<IoEvent>,
    ) -> Handle {
        let (queue_tx, queue) = mpsc::unbounded_channel();
        let sender = Self {
            id,
            write,
            queue,
            events,
        };

        Handle {
            id,
            queue: queue_tx,
            task: tokio::spawn(sender.run()),
        }
    }

    async fn run(mut self) {
        while let Some(outbound) = self.queue.recv().await {
            match outbound {
                Outbound::Frame(frame) => {
                    trace!("socket {}: writing frame: {:?}", self.id, frame);
                    if let Err(e) = self.write.write(&frame).await {
                        let _ = self.events.send(IoEvent::WriteFailed(e));
                        return;
                    }
                }
                Outbound::Shutdown => break,
            }
        }

        // Whatever is queued after the shutdown is racing it and gets dropped with the queue.
        self.queue.close();
        debug!("socket {}: sender drained", self.id);
        let _ = self.events.send(IoEvent::SenderDrained);
    }
}

/// The controller's end of a [`Sender`].
#[derive(Debug)]
pub(super) struct Handle {
    id: SocketId,
    queue: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

impl Handle {
    /// Queue `frame` for writing.
    pub(super) fn send(&self, frame: Vec<u8>) {
        if self.queue.send(Outbound::Frame(frame)).is_err() {
            trace!("socket {}: sender stopped, dropping frame", self.id);
        }
    }

    /// Ask the sender to stop after writing everything queued so far.
    pub(super) fn shutdown(&self) {
        if self.queue.send(Outbound::Shutdown).is_err() {
            trace!("socket {}: sender already stopped", self.id);
        }
    }

    /// Stop the sender right away, dropping the write half and everything still queued.
    pub(super) fn abort(&self) {
        self.task.abort();
    }
}

#[derive(Debug)]
enum Outbound {
    Frame(Vec<u8>),
    Shutdown,
}
