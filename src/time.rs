//! The `CountdownTimer` trait: the external collaborator this core
//! expects to be handed a one-shot, re-armable deadline timer through.
//!
//! Exactly what the exchange paths need: arm a deadline, and
//! non-blockingly ask "has it fired yet?" — mirroring the `nb`-based
//! shape of [`crate::net::DatagramEndpoint`] so both halves of the
//! single suspension point (socket or timer) are polled the same way.

use std::time::Duration;

/// A re-armable, one-shot countdown timer.
pub trait CountdownTimer {
  /// The timer's error type.
  type Error: core::fmt::Debug;

  /// (Re-)arm the timer to fire `dur` from now, discarding any
  /// previously pending deadline.
  fn start(&mut self, dur: Duration) -> Result<(), Self::Error>;

  /// Has the armed deadline passed? Non-blocking: `Err(nb::Error::WouldBlock)`
  /// means "not yet".
  fn poll(&mut self) -> nb::Result<(), Self::Error>;
}
