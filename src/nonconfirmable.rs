//! `NonConfirmablePath`: a single fixed-deadline wait for a response to
//! a Non-confirmable request. No retransmission — NON messages are
//! fire-and-forget at the transport layer.

use crate::classify;
use crate::codec::{CodecError, MessageCodec};
use crate::config::Non;
use crate::error::{Error, When};
use crate::message::{Message, Type};
use crate::net::DatagramEndpoint;
use crate::time::CountdownTimer;

/// Drive `req` (already sent once by the engine) through the NON
/// exchange to completion.
pub fn run<E, T, C>(endpoint: &mut E,
                     timer: &mut T,
                     codec: &C,
                     cfg: &Non,
                     poll_interval: std::time::Duration,
                     req: &Message)
                     -> Result<Message, Error<E>>
  where E: DatagramEndpoint,
        T: CountdownTimer,
        T::Error: Into<E::Error>,
        C: MessageCodec
{
  timer.start(cfg.resp_timeout)
       .map_err(|e| When::AwaitingResponse.what(crate::error::What::Transport(e.into())))?;
  log::debug!("awaiting non-confirmable response ({:?})", cfg.resp_timeout);

  let mut buf = vec![0u8; crate::config::MAX_DATAGRAM_LEN];

  loop {
    match timer.poll() {
      | Ok(()) => {
        log::warn!("giving up waiting for non-confirmable response");
        return Err(When::AwaitingResponse.what(crate::error::What::Timeout));
      },
      | Err(nb::Error::WouldBlock) => {
        let n = match endpoint.recv(&mut buf) {
          | Ok(n) => n,
          | Err(nb::Error::WouldBlock) => {
            std::thread::sleep(poll_interval);
            continue;
          },
          | Err(nb::Error::Other(e)) => {
            return Err(When::AwaitingResponse.what(crate::error::What::Transport(e)))
          },
        };

        let received = match codec.decode(&buf[..n]) {
          | Ok(msg) => msg,
          | Err(CodecError::BadMessage { id }) => {
            log::warn!("format error in received datagram, sending reset for recovered id");
            if let Ok(bytes) = codec.encode_reset(id) {
              let _ = endpoint.send(&bytes);
            }
            continue;
          },
          | Err(CodecError::Malformed) => {
            return Err(When::AwaitingResponse.what(crate::error::What::Codec(CodecError::Malformed)))
          },
        };

        if received.id == req.id && received.ty == Type::Reset {
          return Err(When::AwaitingResponse.what(crate::error::What::ConnectionReset));
        }

        if !received.token_matches(&req.token) {
          reject(endpoint, codec, &received);
          continue;
        }

        match received.ty {
          | Type::Non => return Ok(received),
          | Type::Con => {
            if let Ok(bytes) = codec.encode_empty_ack(received.id) {
              let _ = endpoint.send(&bytes);
            }
            return Ok(received);
          },
          | Type::Ack | Type::Reset => {
            log::warn!("dropping unmatched message while awaiting non-confirmable response");
            continue;
          },
        }
      },
      | Err(nb::Error::Other(e)) => {
        return Err(When::AwaitingResponse.what(crate::error::What::Transport(e.into())))
      },
    }
  }
}

/// Reject an unmatched message: RST for CON, drop (with a log line) for
/// anything else.
fn reject<E: DatagramEndpoint, C: MessageCodec>(endpoint: &mut E, codec: &C, rejected: &Message) {
  match classify::reject_response(rejected) {
    | Some(id) => {
      log::warn!("rejecting unmatched con message, sending reset");
      let Ok(bytes) = codec.encode_reset(id) else { return };
      let _ = endpoint.send(&bytes);
    },
    | None => log::warn!("dropping unmatched non/ack/reset message"),
  }
}
