/// The state of a socket.
///
/// ```text
/// Idle -> Opening -> Open -> Closing -> Closed
///            |         |        |
///            v         +--------+--> Error
///          Idle
/// ```
///
/// `Closed` and `Error` are terminal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Created, nothing acquired yet.
    #[default]
    Idle,
    /// Waiting for the provider to hand out a stream.
    Opening,
    /// Connected; reads are delivered and writes accepted.
    Open,
    /// A graceful close is in progress.
    Closing,
    /// The graceful close completed and the stream was released.
    Closed,
    /// The session ended in a fault and the stream was released.
    Error,
}

impl State {
    /// Whether the socket is connected.
    #[inline]
    pub fn is_connected(self) -> bool {
        self == State::Open
    }

    /// Whether the socket reached a state it never leaves.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Closed | State::Error)
    }
}
