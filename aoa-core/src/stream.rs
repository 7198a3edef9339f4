//! The low-level stream traits that an accessory descriptor has to provide.

use core::future::Future;

/// The accessory stream trait.
///
/// This is the trait that needs to be implemented for a type to be used as the duplex byte stream
/// behind a socket. The socket splits it once, right after acquisition: the read half goes to the
/// receiver, the write half to the sender and the descriptor stays with the socket until release.
pub trait Stream: core::fmt::Debug + Send + 'static {
    /// The read half of the stream.
    type ReadHalf: ReadHalf;
    /// The write half of the stream.
    type WriteHalf: WriteHalf;
    /// The descriptor that keeps the stream alive.
    type Descriptor: Descriptor;

    /// Split the stream into its read and write halves and the underlying descriptor.
    fn split(self) -> (Self::ReadHalf, Self::WriteHalf, Self::Descriptor);
}

/// The read half of a stream.
pub trait ReadHalf: core::fmt::Debug + Send + 'static {
    /// Read from the stream.
    ///
    /// On completion, the number of bytes read is returned, which can be `0`. `None` means the
    /// stream signalled end of stream.
    ///
    /// Notes for implementers:
    ///
    /// * The read is allowed to block the task it runs on until data arrives, the stream faults or
    ///   is closed. Nothing interrupts a read in flight.
    /// * The returned future must be `Send` since it is driven by a spawned task.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = crate::Result<Option<usize>>> + Send;
}

/// The write half of a stream.
pub trait WriteHalf: core::fmt::Debug + Send + 'static {
    /// Write all of `buf` to the stream.
    ///
    /// The write is only considered complete once all bytes were handed to the transport.
    fn write(&mut self, buf: &[u8]) -> impl Future<Output = crate::Result<()>> + Send;
}

/// The descriptor of a stream.
pub trait Descriptor: core::fmt::Debug + Send + 'static {
    /// Release the descriptor.
    ///
    /// Failure is only reported for logging; the descriptor is considered gone either way.
    fn close(self) -> crate::Result<()>;
}

/// The size of the scratch buffer the receiver reads into.
#[cfg(feature = "read-buffer-16kb")]
pub const READ_BUFFER_SIZE: usize = 16 * 1024;
/// The size of the scratch buffer the receiver reads into.
#[cfg(all(not(feature = "read-buffer-16kb"), feature = "read-buffer-4kb"))]
pub const READ_BUFFER_SIZE: usize = 4 * 1024;
/// The size of the scratch buffer the receiver reads into.
#[cfg(all(not(feature = "read-buffer-16kb"), not(feature = "read-buffer-4kb")))]
pub const READ_BUFFER_SIZE: usize = 1024;

/// Documentation-only stream implementations for doc tests.
///
/// These types exist only to make doc tests compile and should never be used in real code.
#[doc(hidden)]
pub mod impl_for_doc {

    /// A mock stream for documentation examples.
    #[derive(Debug)]
    pub struct Stream;

    impl super::Stream for Stream {
        type ReadHalf = ReadHalf;
        type WriteHalf = WriteHalf;
        type Descriptor = Descriptor;

        fn split(self) -> (Self::ReadHalf, Self::WriteHalf, Self::Descriptor) {
            (ReadHalf, WriteHalf, Descriptor)
        }
    }

    /// A mock read half for documentation examples.
    #[derive(Debug)]
    pub struct ReadHalf;

    impl super::ReadHalf for ReadHalf {
        async fn read(&mut self, _buf: &mut [u8]) -> crate::Result<Option<usize>> {
            unreachable!("This is only for doc tests")
        }
    }

    /// A mock write half for documentation examples.
    #[derive(Debug)]
    pub struct WriteHalf;

    impl super::WriteHalf for WriteHalf {
        async fn write(&mut self, _buf: &[u8]) -> crate::Result<()> {
            unreachable!("This is only for doc tests")
        }
    }

    /// A mock descriptor for documentation examples.
    #[derive(Debug)]
    pub struct Descriptor;

    impl super::Descriptor for Descriptor {
        fn close(self) -> crate::Result<()> {
            Ok(())
        }
    }
}
