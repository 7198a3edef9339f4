//! A [`Listener`] that turns socket notifications into a stream.
//!
//! This is useful for consumers that would rather `.await` the next event than implement a
//! callback trait, and for handling the events in a separate task.

use core::{
    pin::Pin,
    task::{Context, Poll},
};

use aoa_core::{trace, ErrorKind, Listener};
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Create a listener and the stream of events it produces.
///
/// `close_command` is the frame sent to the peer when the socket is closed gracefully.
pub fn channel<C>(close_command: C) -> (ChannelListener, Events)
where
    C: Into<Vec<u8>>,
{
    let (tx, rx) = mpsc::unbounded_channel();

    (
        ChannelListener {
            tx,
            close_command: close_command.into(),
        },
        Events(UnboundedReceiverStream::new(rx)),
    )
}

/// A socket notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The socket is open.
    Opened,
    /// A frame arrived.
    Read(Vec<u8>),
    /// The session ended.
    Error(ErrorKind),
}

/// The [`Listener`] half of [`channel`].
#[derive(Debug)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<Event>,
    close_command: Vec<u8>,
}

impl ChannelListener {
    fn notify(&self, event: Event) {
        if self.tx.send(event).is_err() {
            // The stream was dropped, so no one is interested.
            trace!("event stream dropped, discarding event");
        }
    }
}

impl Listener for ChannelListener {
    fn on_open(&mut self) {
        self.notify(Event::Opened);
    }

    fn on_read(&mut self, frame: Vec<u8>) {
        self.notify(Event::Read(frame));
    }

    fn on_error(&mut self, kind: ErrorKind) {
        self.notify(Event::Error(kind));
    }

    fn on_provide_close_command(&mut self) -> Vec<u8> {
        self.close_command.clone()
    }
}

/// The stream half of [`channel`].
///
/// Ends when the socket task is gone.
#[derive(Debug)]
pub struct Events(UnboundedReceiverStream<Event>);

impl Stream for Events {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.0).poll_next(cx)
    }
}
