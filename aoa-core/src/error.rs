/// The Error type for the aoa crates.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error.
    Io(std::io::Error),
    /// The stream signalled end of stream.
    UnexpectedEof,
    /// The provider could not hand out a descriptor for the accessory.
    AccessoryUnavailable,
}

/// The Result type for the aoa crates.
pub type Result<T> = core::result::Result<T, Error>;

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::UnexpectedEof => write!(f, "Unexpected end of stream"),
            Error::AccessoryUnavailable => write!(f, "No descriptor available for the accessory"),
        }
    }
}

/// The kind of error reported to a [`crate::Listener`].
///
/// Every kind is terminal for the session it is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The descriptor could not be acquired. Nothing was acquired so nothing was cleaned up.
    OpenFail,
    /// Reading from or writing to the stream failed once connected.
    TransportFault,
    /// The platform reported that the accessory was detached.
    Detached,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorKind::OpenFail => write!(f, "failed to open the accessory"),
            ErrorKind::TransportFault => write!(f, "transport fault"),
            ErrorKind::Detached => write!(f, "accessory detached"),
        }
    }
}
