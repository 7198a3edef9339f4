//! Mock stream implementations for testing.
//!
//! The read side is scripted by the test through a [`Script`], the write side can be switched to
//! failing, and writes as well as the release of the descriptor are recorded in a shared [`Log`]
//! so tests can check what reached the transport and in which order.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use aoa_core::{
    stream::{Descriptor, ReadHalf, Stream, WriteHalf},
    Error, Result,
};
use tokio::sync::mpsc;

/// Something that happened to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Write(Vec<u8>),
    Release,
}

/// The shared record of everything that reached the transport.
#[derive(Debug, Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<Op>>>);

impl Log {
    fn push(&self, op: Op) {
        self.0.lock().unwrap().push(op);
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.0.lock().unwrap().clone()
    }

    /// All written bytes, concatenated.
    pub(crate) fn written(&self) -> Vec<u8> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Write(bytes) => Some(bytes),
                Op::Release => None,
            })
            .flatten()
            .collect()
    }

    pub(crate) fn releases(&self) -> usize {
        self.ops().iter().filter(|op| **op == Op::Release).count()
    }

    /// Wait until `condition` holds for the recorded operations.
    pub(crate) async fn wait_until<F>(&self, condition: F)
    where
        F: Fn(&[Op]) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition(&self.ops()) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out, transport saw: {:?}", self.ops()));
    }
}

/// What the next read returns.
#[derive(Debug)]
enum Read {
    Data(Vec<u8>),
    Eof,
    Fail,
}

/// The test's end of the read side.
///
/// Dropping it makes pending and later reads fail, like a peer going away.
#[derive(Debug, Clone)]
pub(crate) struct Script(mpsc::UnboundedSender<Read>);

impl Script {
    pub(crate) fn data(&self, bytes: &[u8]) {
        self.push(Read::Data(bytes.to_vec()));
    }

    pub(crate) fn eof(&self) {
        self.push(Read::Eof);
    }

    pub(crate) fn fail(&self) {
        self.push(Read::Fail);
    }

    fn push(&self, read: Read) {
        // The read half might be gone already, e.g after a teardown. That's fine.
        let _ = self.0.send(read);
    }
}

/// Makes writes fail once set.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteSwitch(Arc<AtomicBool>);

impl WriteSwitch {
    pub(crate) fn fail(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Mock stream implementation for testing.
#[derive(Debug)]
pub(crate) struct MockStream {
    reads: mpsc::UnboundedReceiver<Read>,
    writes: WriteSwitch,
    log: Log,
}

impl MockStream {
    pub(crate) fn new() -> (Self, Script, WriteSwitch, Log) {
        let (tx, reads) = mpsc::unbounded_channel();
        let writes = WriteSwitch::default();
        let log = Log::default();
        let stream = Self {
            reads,
            writes: writes.clone(),
            log: log.clone(),
        };

        (stream, Script(tx), writes, log)
    }
}

impl Stream for MockStream {
    type ReadHalf = MockReadHalf;
    type WriteHalf = MockWriteHalf;
    type Descriptor = MockDescriptor;

    fn split(self) -> (Self::ReadHalf, Self::WriteHalf, Self::Descriptor) {
        (
            MockReadHalf { reads: self.reads },
            MockWriteHalf {
                fail: self.writes,
                log: self.log.clone(),
            },
            MockDescriptor { log: self.log },
        )
    }
}

/// Mock read half implementation.
#[derive(Debug)]
pub(crate) struct MockReadHalf {
    reads: mpsc::UnboundedReceiver<Read>,
}

impl ReadHalf for MockReadHalf {
    async fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.reads.recv().await {
            Some(Read::Data(data)) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok(Some(data.len()))
            }
            Some(Read::Eof) => Ok(None),
            Some(Read::Fail) | None => Err(Error::Io(io::ErrorKind::BrokenPipe.into())),
        }
    }
}

/// Mock write half implementation.
#[derive(Debug)]
pub(crate) struct MockWriteHalf {
    fail: WriteSwitch,
    log: Log,
}

impl WriteHalf for MockWriteHalf {
    async fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.fail.0.load(Ordering::SeqCst) {
            return Err(Error::Io(io::ErrorKind::BrokenPipe.into()));
        }
        self.log.push(Op::Write(buf.to_vec()));

        Ok(())
    }
}

/// Mock descriptor implementation.
#[derive(Debug)]
pub(crate) struct MockDescriptor {
    log: Log,
}

impl Descriptor for MockDescriptor {
    fn close(self) -> Result<()> {
        self.log.push(Op::Release);

        Ok(())
    }
}
