use std::os::fd::OwnedFd;

use aoa_core::stream;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};

use crate::Result;

/// The [`stream::Stream`] implementation over a Unix file descriptor.
///
/// The halves work on duplicates of the descriptor, so that reading and writing never wait on each
/// other.
#[derive(Debug)]
pub struct Stream {
    read: File,
    write: File,
    descriptor: OwnedFd,
}

impl Stream {
    /// Create a stream over `fd`.
    pub fn new(fd: OwnedFd) -> Result<Self> {
        let read = std::fs::File::from(fd.try_clone()?);
        let write = std::fs::File::from(fd.try_clone()?);

        Ok(Self {
            read: File::from_std(read),
            write: File::from_std(write),
            descriptor: fd,
        })
    }
}

impl TryFrom<OwnedFd> for Stream {
    type Error = crate::Error;

    fn try_from(fd: OwnedFd) -> Result<Self> {
        Self::new(fd)
    }
}

impl stream::Stream for Stream {
    type ReadHalf = ReadHalf;
    type WriteHalf = WriteHalf;
    type Descriptor = Descriptor;

    fn split(self) -> (Self::ReadHalf, Self::WriteHalf, Self::Descriptor) {
        (
            ReadHalf(self.read),
            WriteHalf(self.write),
            Descriptor(self.descriptor),
        )
    }
}

/// The [`stream::ReadHalf`] implementation over a Unix file descriptor.
#[derive(Debug)]
pub struct ReadHalf(File);

impl stream::ReadHalf for ReadHalf {
    async fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let n = self.0.read(buf).await?;
        if n == 0 && !buf.is_empty() {
            // A descriptor reports end of stream as an empty read.
            return Ok(None);
        }

        Ok(Some(n))
    }
}

/// The [`stream::WriteHalf`] implementation over a Unix file descriptor.
#[derive(Debug)]
pub struct WriteHalf(File);

impl stream::WriteHalf for WriteHalf {
    async fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.0.write_all(buf).await?;
        // `File` completes writes in the background, only a flush tells us they happened.
        self.0.flush().await?;

        Ok(())
    }
}

/// The [`stream::Descriptor`] implementation over a Unix file descriptor.
#[derive(Debug)]
pub struct Descriptor(OwnedFd);

impl stream::Descriptor for Descriptor {
    fn close(self) -> Result<()> {
        drop(self.0);

        Ok(())
    }
}
