//! `ExchangeEngine`: validates a caller's request, stamps fresh
//! identifiers onto it, sends it once, and dispatches to the path state
//! machine matching its type.

use rand::RngCore;

use crate::codec::MessageCodec;
use crate::config::Config;
use crate::error::{Error, When};
use crate::message::{Message, MessageId, Token, Type};
use crate::net::DatagramEndpoint;
use crate::time::CountdownTimer;
use crate::{confirmable, nonconfirmable};

/// Generate a 16-bit message-id the same way the source does: two random
/// bytes composed little-endian (`b1 << 8 | b0`).
fn gen_message_id(rng: &mut impl RngCore) -> MessageId {
  let mut bytes = [0u8; 2];
  rng.fill_bytes(&mut bytes);
  MessageId((bytes[1] as u16) << 8 | bytes[0] as u16)
}

fn gen_token(rng: &mut impl RngCore) -> Token {
  let mut bytes = [0u8; crate::config::TOKEN_LEN];
  rng.fill_bytes(&mut bytes);
  Token::from_bytes(&bytes)
}

/// Run one request/response exchange to completion.
///
/// `req` must be a request (`type ∈ {CON, NON}`, a request code); its
/// `id` and `token` are overwritten with freshly generated values
/// regardless of what the caller supplied.
pub fn exchange<E, T, C>(endpoint: &mut E,
                          timer: &mut T,
                          codec: &C,
                          cfg: &Config,
                          rng: &mut impl RngCore,
                          mut req: Message)
                          -> Result<Message, Error<E>>
  where E: DatagramEndpoint,
        T: CountdownTimer,
        T::Error: Into<E::Error>,
        C: MessageCodec
{
  if matches!(req.ty, Type::Ack | Type::Reset)
     || req.code.kind() != crate::message::CodeClass::Request
  {
    return Err(When::Sending.what(crate::error::What::InvalidArgument));
  }

  req.id = gen_message_id(rng);
  req.token = gen_token(rng);

  let bytes = codec.encode(&req)
                    .map_err(|e| When::Sending.what(crate::error::What::Codec(e)))?;
  req.raw = bytes;

  log::info!("sending {}", crate::logging::msg_summary(&req));

  send_blocking(endpoint, &req.raw).map_err(|e| When::Sending.what(crate::error::What::Transport(e)))?;

  match req.ty {
    | Type::Non => nonconfirmable::run(endpoint, timer, codec, &cfg.non, cfg.poll_interval, &req),
    | Type::Con => confirmable::run(endpoint, timer, codec, &cfg.con, rng, cfg.poll_interval, &req),
    | Type::Ack | Type::Reset => unreachable!("validated above"),
  }
}

fn send_blocking<E: DatagramEndpoint>(endpoint: &mut E, bytes: &[u8]) -> Result<(), E::Error> {
  loop {
    match endpoint.send(bytes) {
      | Ok(()) => return Ok(()),
      | Err(nb::Error::WouldBlock) => continue,
      | Err(nb::Error::Other(e)) => return Err(e),
    }
  }
}
