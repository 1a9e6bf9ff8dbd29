//! Error taxonomy for the exchange core.
//!
//! A `When` / `What` split: `What` is a contextless cause, `When` is the
//! phase of the exchange it was encountered in. Bundling both avoids
//! every call site having to match on a flat, undifferentiated enum.

use core::fmt;

use crate::net::DatagramEndpoint;

/// The phase of an exchange an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// Constructing the `Client` (socket/timer setup, address parsing).
  Constructing,
  /// Validating or sending the initial request.
  Sending,
  /// Waiting for an ACK (CON Phase A).
  AwaitingAck,
  /// Waiting for a separate response (CON Phase B, or the NON path).
  AwaitingResponse,
}

impl When {
  /// Construct a specific error from the context it occurred in.
  pub fn what<E: DatagramEndpoint>(self, what: What<E>) -> Error<E> {
    Error { when: self, what }
  }
}

/// An error encounterable while driving an exchange.
#[derive(Debug)]
pub struct Error<E: DatagramEndpoint> {
  /// What happened?
  pub what: What<E>,
  /// What was the client doing when it happened?
  pub when: When,
}

impl<E: DatagramEndpoint> Error<E> {
  /// Does this error correspond to the exchange simply timing out?
  pub fn is_timeout(&self) -> bool {
    matches!(self.what, What::Timeout)
  }
}

impl<E: DatagramEndpoint> fmt::Display for Error<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} (while {:?})", self.what, self.when)
  }
}

impl<E: DatagramEndpoint> std::error::Error for Error<E> where E::Error: std::error::Error + 'static
{
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match &self.what {
      | What::Transport(e) => Some(e),
      | _ => None,
    }
  }
}

/// A contextless error cause: `InvalidArgument`, `Timeout`,
/// `ConnectionReset`, `Transport`, `Codec`. A plain "this one datagram
/// failed to parse" outcome is deliberately absent here — it's
/// transient and handled internally, never surfaced to the caller of
/// `exchange`.
#[derive(Debug)]
pub enum What<E: DatagramEndpoint> {
  /// The caller-supplied request violated the contract of `exchange`
  /// (wrong message type, or not a request code).
  InvalidArgument,
  /// The server returned a Reset matching our Message-ID.
  ConnectionReset,
  /// No ACK arrived after the maximum number of retransmissions, or the
  /// separate-response deadline expired.
  Timeout,
  /// An OS-level I/O failure on the socket or timer. Fatal to the exchange.
  Transport(E::Error),
  /// A non-recoverable codec failure (serializing the request, or a
  /// received-message parse failure that wasn't a plain `BadMessage`).
  Codec(crate::codec::CodecError),
}
