//! The `DatagramEndpoint` trait: the external collaborator this core
//! expects to be handed a connected, non-blocking datagram transport
//! through.
//!
//! Narrowed to a single already-connected peer (this core never needs
//! multicast, raw binding, or an address on every call — `exchange`
//! always talks to exactly one server), `nb`-based to fit the same
//! cooperative-poll discipline used elsewhere in this crate.

use core::fmt;

/// A non-blocking, already-connected datagram transport to a single peer.
///
/// Implementors are expected to behave like a connected UDP socket: `send`
/// transmits to the peer address fixed at construction, `recv` only
/// yields datagrams from that same peer. Both methods are `nb`-style:
/// `Err(nb::Error::WouldBlock)` means "try again later", matching a
/// std socket's `set_nonblocking(true)` behavior.
pub trait DatagramEndpoint {
  /// The transport-level error type (e.g. `std::io::Error`).
  type Error: fmt::Debug;

  /// Send a datagram to the connected peer. Non-blocking.
  fn send(&mut self, dgram: &[u8]) -> nb::Result<(), Self::Error>;

  /// Receive a datagram from the connected peer into `buf`, returning
  /// the number of bytes written. Non-blocking.
  fn recv(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;
}
