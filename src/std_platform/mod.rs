//! Concrete `std`-backed implementations of [`crate::net::DatagramEndpoint`]
//! and [`crate::time::CountdownTimer`], plus a convenience `Client`
//! constructor that wires them together the way a real process wants.
//!
//! A non-blocking, `connect`-ed `UdpSocket` with an `io_to_nb` WouldBlock
//! mapping.

mod net;
mod timer;

pub use net::UdpEndpoint;
pub use timer::InstantTimer;

use crate::client::{Client, ClientConfig};
use crate::codec::MessageCodec;
use crate::config::Config;
use crate::error::{Error, When, What};

/// `UdpEndpoint::connect` reports a host string that didn't parse as an
/// IP literal via `io::ErrorKind::InvalidInput`; everything else is a
/// genuine OS-level failure (bind/connect/set_nonblocking).
fn construct_err(e: std::io::Error) -> Error<UdpEndpoint> {
  if e.kind() == std::io::ErrorKind::InvalidInput {
    When::Constructing.what(What::InvalidArgument)
  } else {
    When::Constructing.what(What::Transport(e))
  }
}

/// Build a `Client` bound to `(host, port)` over a real, non-blocking
/// UDP socket, with an `std::time::Instant`-backed timer and an RNG
/// seeded from the system's source of randomness.
///
/// `host` must be a textual IP address; no DNS resolution is performed.
pub fn connect<C: MessageCodec>(host: &str,
                                 port: u16,
                                 config: Config,
                                 codec: C)
                                 -> Result<Client<UdpEndpoint, InstantTimer, C>, Error<UdpEndpoint>> {
  let endpoint = UdpEndpoint::connect(host, port).map_err(construct_err)?;
  let timer = InstantTimer::new();
  let rng_seed = rand::random();

  Ok(Client::new(ClientConfig { endpoint, timer, config, rng_seed }, codec))
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::codec::CodecError;
  use crate::message::{Message, MessageId};

  struct NoopCodec;

  impl MessageCodec for NoopCodec {
    fn encode(&self, _msg: &Message) -> Result<Vec<u8>, CodecError> {
      Ok(vec![])
    }

    fn decode(&self, _bytes: &[u8]) -> Result<Message, CodecError> {
      Err(CodecError::Malformed)
    }

    fn encode_reset(&self, _id: MessageId) -> Result<Vec<u8>, CodecError> {
      Ok(vec![])
    }

    fn encode_empty_ack(&self, _id: MessageId) -> Result<Vec<u8>, CodecError> {
      Ok(vec![])
    }
  }

  #[test]
  fn malformed_host_is_invalid_argument_not_transport() {
    let err = connect("not-an-ip", 1234, Config::default(), NoopCodec).unwrap_err();
    assert!(matches!(err.what, What::InvalidArgument));
  }
}
