//! Runtime-tunable constants for the exchange core.
//!
//! The protocol constants from RFC 7252 §4.8 are `Default`-valued fields
//! on a `Config` struct rather than bare `const`s, so a caller (or a
//! test) can override them without forking the crate. Test code in
//! particular shrinks these to millisecond scale so end-to-end scenarios
//! run in a fraction of a second instead of tens of seconds.

use std::time::Duration;

use crate::retry::{Attempts, Strategy};

/// Length, in bytes, of the token this core generates for every request.
///
/// RFC 7252 allows 0..=8; this core always generates exactly this many.
pub const TOKEN_LEN: usize = 4;

/// Upper bound on a received datagram's size. Oversized datagrams are
/// truncated by the transport and therefore parse as malformed, taking
/// the format-error-reset path rather than growing buffers unbounded.
pub const MAX_DATAGRAM_LEN: usize = 1152;

/// Configuration governing the Confirmable (CON) retransmission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Con {
  /// Retry strategy used while waiting for the ACK (Phase A).
  ///
  /// Defaults to `ACK_TIMEOUT` (2s) plus `[0, 1000)ms` jitter, doubling
  /// on every retransmit, per RFC 7252 §4.8.
  pub ack_retry_strategy: Strategy,
  /// Maximum number of retransmissions before giving up (`MAX_RETRANSMIT`).
  ///
  /// Defaults to 4, matching RFC 7252's recommended default.
  pub max_retransmit: Attempts,
  /// Fixed deadline for a separate response once the ACK has arrived
  /// (Phase B). No jitter; RFC 7252's `EXCHANGE_LIFETIME` is out of
  /// scope for this core, which instead uses a flat `RESP_TIMEOUT`.
  pub resp_timeout: Duration,
}

/// Configuration governing the Non-confirmable (NON) response-wait path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Non {
  /// Fixed deadline to wait for a response.
  pub resp_timeout: Duration,
}

impl Default for Con {
  fn default() -> Self {
    Con { ack_retry_strategy: Strategy::Exponential { init_min: Duration::from_secs(2),
                                                      init_max: Duration::from_millis(3000) },
          max_retransmit: Attempts(4),
          resp_timeout: Duration::from_secs(30) }
  }
}

impl Default for Non {
  fn default() -> Self {
    Non { resp_timeout: Duration::from_secs(30) }
  }
}

/// Runtime config for a [`crate::client::Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  /// See [`Con`].
  pub con: Con,
  /// See [`Non`].
  pub non: Non,
  /// How long the transport glue sleeps between unsuccessful polls of
  /// socket and timer while waiting. Not part of the protocol; purely a
  /// local cooperative-scheduling knob.
  pub poll_interval: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Config { con: Con::default(),
             non: Non::default(),
             poll_interval: Duration::from_millis(5) }
  }
}
