//! Test helpers: a scripted stream and the platform collaborators around it.

mod mock_stream;
pub(crate) use mock_stream::{Log, MockStream, Op, Script, WriteSwitch};

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use aoa_core::{Error, Manager, Provider, Result, SocketId};
use futures_util::StreamExt;

use crate::{
    events::{self, Event, Events},
    Socket,
};

/// The close command the test listeners hand out.
pub(crate) const CLOSE_COMMAND: &[u8] = b"BYE";

/// Hands out queued mock streams and records disposals.
#[derive(Debug, Default)]
pub(crate) struct MockManager {
    provider: MockProvider,
    disposed: Mutex<Vec<SocketId>>,
}

impl MockManager {
    pub(crate) fn disposed(&self) -> Vec<SocketId> {
        self.disposed.lock().unwrap().clone()
    }

    pub(crate) fn opens(&self) -> usize {
        self.provider.opens.load(Ordering::SeqCst)
    }

    /// Queue a stream for the next open and return the test's handles on it.
    pub(crate) fn push_stream(&self) -> (Script, WriteSwitch, Log) {
        let (stream, script, writes, log) = MockStream::new();
        self.provider.streams.lock().unwrap().push_back(stream);

        (script, writes, log)
    }

    /// Wait until `socket` was disposed.
    pub(crate) async fn wait_disposed(&self, socket: SocketId) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.disposed().contains(&socket) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("socket not disposed in time");
    }
}

impl Manager for MockManager {
    type Provider = MockProvider;

    fn provide_manager(&self) -> &MockProvider {
        &self.provider
    }

    fn dispose_socket(&self, socket: SocketId) {
        self.disposed.lock().unwrap().push(socket);
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockProvider {
    streams: Mutex<VecDeque<MockStream>>,
    opens: AtomicUsize,
}

impl Provider for MockProvider {
    type Accessory = &'static str;
    type Stream = MockStream;

    async fn open_accessory(&self, _accessory: &&'static str) -> Result<MockStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(Error::AccessoryUnavailable)
    }
}

/// A socket over `manager` listened to through an event stream.
pub(crate) fn socket(manager: &Arc<MockManager>) -> (Socket<&'static str>, Events) {
    let (listener, events) = events::channel(CLOSE_COMMAND);

    (Socket::new(manager.clone(), "accessory", listener), events)
}

/// The next event, failing the test if none arrives in time.
pub(crate) async fn next_event(events: &mut Events) -> Event {
    tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream ended")
}

/// Assert no event arrives for a little while.
pub(crate) async fn assert_quiet(events: &mut Events) {
    if let Ok(event) = tokio::time::timeout(Duration::from_millis(100), events.next()).await {
        panic!("unexpected event: {event:?}");
    }
}
