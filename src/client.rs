//! `Client`: owns the transport, timer, and per-instance RNG used to
//! drive CoAP exchanges.
//!
//! Splits construction between a convenience `std`-backed constructor
//! ([`crate::std_platform::connect`]) and this fully generic one taking
//! caller-supplied collaborators.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::codec::MessageCodec;
use crate::config::Config;
use crate::error::Error;
use crate::message::Message;
use crate::net::DatagramEndpoint;
use crate::time::CountdownTimer;

/// Bring-your-own-transport configuration for a [`Client`]: the pieces
/// that differ between a real `std` process and an embedded target or
/// test double.
pub struct ClientConfig<Endpoint, Timer> {
  /// The connected datagram transport.
  pub endpoint: Endpoint,
  /// The countdown timer used for both ACK and response deadlines.
  pub timer: Timer,
  /// Protocol and scheduling configuration. Defaults match RFC 7252.
  pub config: Config,
  /// Seed for this client's RNG. Two `Client`s built with the same seed
  /// generate the same sequence of message-ids and tokens — useful for
  /// reproducible tests.
  pub rng_seed: u64,
}

/// Owns one endpoint's worth of CoAP exchange state: the transport, the
/// timer, and an RNG used to generate per-exchange message-ids and
/// tokens.
///
/// Not `Send`/`Sync`-required to use concurrently — a `Client` drives
/// exactly one `exchange` at a time on the thread that calls it.
pub struct Client<Endpoint, Timer, Codec> {
  endpoint: Endpoint,
  timer: Timer,
  codec: Codec,
  config: Config,
  rng: ChaCha8Rng,
}

impl<Endpoint, Timer, Codec> Client<Endpoint, Timer, Codec>
  where Endpoint: DatagramEndpoint,
        Timer: CountdownTimer,
        Timer::Error: Into<Endpoint::Error>,
        Codec: MessageCodec
{
  /// Build a `Client` from caller-supplied collaborators: an
  /// already-connected transport, a countdown timer, a wire codec, and
  /// configuration.
  pub fn new(cfg: ClientConfig<Endpoint, Timer>, codec: Codec) -> Self {
    Client { endpoint: cfg.endpoint,
             timer: cfg.timer,
             codec,
             config: cfg.config,
             rng: ChaCha8Rng::seed_from_u64(cfg.rng_seed) }
  }

  /// Run one request/response exchange to completion, blocking the
  /// calling thread until a terminal outcome (success or error).
  ///
  /// `req.id` and `req.token` are overwritten with freshly generated
  /// values; whatever the caller set is discarded.
  pub fn exchange(&mut self, req: Message) -> Result<Message, Error<Endpoint>> {
    crate::engine::exchange(&mut self.endpoint,
                             &mut self.timer,
                             &self.codec,
                             &self.config,
                             &mut self.rng,
                             req)
  }

  /// Borrow this client's configuration.
  pub fn config(&self) -> &Config {
    &self.config
  }
}

/// Convenience extension for `Result<Message, Error<E>>`: collapses a
/// benign timeout into `Ok(None)` for call sites (typically
/// fire-and-forget NON requests) that don't consider "nobody answered" a
/// hard failure.
pub trait ClientResultExt<E: DatagramEndpoint> {
  /// Turn a `Timeout` error into `Ok(None)`; leave every other outcome
  /// untouched (wrapping success in `Some`).
  fn timeout_ok(self) -> Result<Option<Message>, Error<E>>;
}

impl<E: DatagramEndpoint> ClientResultExt<E> for Result<Message, Error<E>> {
  fn timeout_ok(self) -> Result<Option<Message>, Error<E>> {
    match self {
      | Ok(msg) => Ok(Some(msg)),
      | Err(e) if e.is_timeout() => Ok(None),
      | Err(e) => Err(e),
    }
  }
}
