//! `ConfirmablePath`: drives a Confirmable (CON) request through its two
//! phases — ACK wait with retransmission, then (if the ACK arrived bare)
//! a separate-response wait.
//!
//! Encoded as the tagged state the design calls for rather than the
//! source's nested `while` loops, so illegal transitions (e.g. resuming
//! Phase A after a response was already delivered) aren't representable.

use std::time::Instant;

use rand::RngCore;

use crate::classify::{self, Action};
use crate::codec::{CodecError, MessageCodec};
use crate::config::Con;
use crate::error::{Error, When};
use crate::message::{Message, MessageId};
use crate::net::DatagramEndpoint;
use crate::retry::{Attempts, RetryTimer, YouShould};
use crate::time::CountdownTimer;

/// Where a `ConfirmablePath` run currently stands.
enum State {
  AwaitingAck,
  AwaitingResponse,
  Done(Message),
}

/// Drive `req` (already sent once by the engine) through the CON
/// exchange to completion.
pub fn run<E, T, C>(endpoint: &mut E,
                     timer: &mut T,
                     codec: &C,
                     cfg: &Con,
                     rng: &mut impl RngCore,
                     poll_interval: std::time::Duration,
                     req: &Message)
                     -> Result<Message, Error<E>>
  where E: DatagramEndpoint,
        T: CountdownTimer,
        T::Error: Into<E::Error>,
        C: MessageCodec
{
  // `RetryTimer` cries once `attempts >= max_attempts`, i.e. it performs
  // `max_attempts - 1` retransmits; pass one more than `max_retransmit`
  // so the configured number of retransmissions actually happen before
  // giving up.
  let retry_budget = Attempts(cfg.max_retransmit.0.saturating_add(1));
  let mut retry = RetryTimer::new(Instant::now(), cfg.ack_retry_strategy, retry_budget, rng);
  timer.start(retry.initial_delay())
       .map_err(|e| When::AwaitingAck.what(crate::error::What::Transport(e.into())))?;
  log::debug!("started ack timer ({:?})", retry.initial_delay());

  let mut buf = vec![0u8; crate::config::MAX_DATAGRAM_LEN];
  let mut state = State::AwaitingAck;

  loop {
    match state {
      | State::Done(msg) => return Ok(msg),
      | State::AwaitingAck => {
        if let Some(next) = poll_phase_a(endpoint, timer, codec, &mut retry, req, &mut buf)? {
          state = next;
          if matches!(state, State::AwaitingResponse) {
            timer.start(cfg.resp_timeout)
                 .map_err(|e| When::AwaitingResponse.what(crate::error::What::Transport(e.into())))?;
            log::debug!("ack received, now awaiting separate response ({:?})", cfg.resp_timeout);
          }
        }
      },
      | State::AwaitingResponse => {
        if let Some(msg) = poll_phase_b(endpoint, timer, codec, req, &mut buf)? {
          state = State::Done(msg);
        }
      },
    }

    std::thread::sleep(poll_interval);
  }
}

/// One iteration of Phase A. Returns `Ok(Some(next_state))` on a state
/// transition, `Ok(None)` to keep looping in Phase A.
fn poll_phase_a<E, T, C>(endpoint: &mut E,
                          timer: &mut T,
                          codec: &C,
                          retry: &mut RetryTimer,
                          req: &Message,
                          buf: &mut [u8])
                          -> Result<Option<State>, Error<E>>
  where E: DatagramEndpoint,
        T: CountdownTimer,
        T::Error: Into<E::Error>,
        C: MessageCodec
{
  match timer.poll() {
    | Ok(()) => {
      match retry.what_should_i_do(Instant::now()) {
        | Ok(YouShould::Cry) => {
          log::warn!("giving up waiting for ack after max retransmits");
          Err(When::AwaitingAck.what(crate::error::What::Timeout))
        },
        | Ok(YouShould::Retry) => {
          log::debug!("ack timer fired, retransmitting (attempt {})", retry.attempts().0);
          timer.start(retry.next_delay())
               .map_err(|e| When::AwaitingAck.what(crate::error::What::Transport(e.into())))?;
          resend(endpoint, req)?;
          Ok(None)
        },
        | Err(_) => {
          // The real timer fired slightly ahead of this timer's own
          // elapsed-time bookkeeping; not actually time to give up or
          // retransmit yet, just re-arm for what's left and keep waiting.
          timer.start(retry.remaining(Instant::now()))
               .map_err(|e| When::AwaitingAck.what(crate::error::What::Transport(e.into())))?;
          Ok(None)
        },
      }
    },
    | Err(nb::Error::WouldBlock) => poll_socket_phase_a(endpoint, codec, req, buf),
    | Err(nb::Error::Other(e)) => Err(When::AwaitingAck.what(crate::error::What::Transport(e.into()))),
  }
}

fn poll_socket_phase_a<E, C>(endpoint: &mut E, codec: &C, req: &Message, buf: &mut [u8])
                              -> Result<Option<State>, Error<E>>
  where E: DatagramEndpoint,
        C: MessageCodec
{
  let n = match endpoint.recv(buf) {
    | Ok(n) => n,
    | Err(nb::Error::WouldBlock) => return Ok(None),
    | Err(nb::Error::Other(e)) => return Err(When::AwaitingAck.what(crate::error::What::Transport(e))),
  };

  let received = match codec.decode(&buf[..n]) {
    | Ok(msg) => msg,
    | Err(CodecError::BadMessage { id }) => {
      format_error_reset(endpoint, codec, id);
      return Ok(None);
    },
    | Err(CodecError::Malformed) => {
      return Err(When::AwaitingAck.what(crate::error::What::Codec(CodecError::Malformed)))
    },
  };

  if received.id == req.id && received.ty == crate::message::Type::Ack && received.token_matches(&req.token)
     && !received.is_empty()
  {
    log::info!("piggy-backed response received");
    return Ok(Some(State::Done(received)));
  }

  match classify::classify(req.id, &req.token, true, &received) {
    | Action::AckReceived => Ok(Some(State::AwaitingResponse)),
    | Action::Reset => Err(When::AwaitingAck.what(crate::error::What::ConnectionReset)),
    | Action::DeliverAndAck => {
      send_ack(endpoint, codec, received.id);
      log::info!("con response served as implicit ack");
      Ok(Some(State::Done(received)))
    },
    | Action::Deliver => Ok(Some(State::Done(received))),
    | Action::Drop | Action::FormatErrorReset => {
      reject(endpoint, codec, &received);
      Ok(None)
    },
  }
}

/// One iteration of Phase B.
fn poll_phase_b<E, T, C>(endpoint: &mut E, timer: &mut T, codec: &C, req: &Message, buf: &mut [u8])
                          -> Result<Option<Message>, Error<E>>
  where E: DatagramEndpoint,
        T: CountdownTimer,
        T::Error: Into<E::Error>,
        C: MessageCodec
{
  match timer.poll() {
    | Ok(()) => {
      log::warn!("giving up waiting for separate response");
      Err(When::AwaitingResponse.what(crate::error::What::Timeout))
    },
    | Err(nb::Error::WouldBlock) => {
      let n = match endpoint.recv(buf) {
        | Ok(n) => n,
        | Err(nb::Error::WouldBlock) => return Ok(None),
        | Err(nb::Error::Other(e)) => {
          return Err(When::AwaitingResponse.what(crate::error::What::Transport(e)))
        },
      };

      let received = match codec.decode(&buf[..n]) {
        | Ok(msg) => msg,
        | Err(CodecError::BadMessage { id }) => {
          format_error_reset(endpoint, codec, id);
          return Ok(None);
        },
        | Err(CodecError::Malformed) => {
          return Err(When::AwaitingResponse.what(crate::error::What::Codec(CodecError::Malformed)))
        },
      };

      if received.id == req.id && received.ty == crate::message::Type::Reset {
        return Err(When::AwaitingResponse.what(crate::error::What::ConnectionReset));
      }

      if !received.token_matches(&req.token) {
        reject(endpoint, codec, &received);
        return Ok(None);
      }

      match received.ty {
        | crate::message::Type::Con => {
          send_ack(endpoint, codec, received.id);
          Ok(Some(received))
        },
        | crate::message::Type::Non => Ok(Some(received)),
        | crate::message::Type::Ack | crate::message::Type::Reset => {
          reject(endpoint, codec, &received);
          Ok(None)
        },
      }
    },
    | Err(nb::Error::Other(e)) => Err(When::AwaitingResponse.what(crate::error::What::Transport(e.into()))),
  }
}

fn resend<E: DatagramEndpoint>(endpoint: &mut E, req: &Message) -> Result<(), Error<E>> {
  loop {
    match endpoint.send(&req.raw) {
      | Ok(()) => return Ok(()),
      | Err(nb::Error::WouldBlock) => continue,
      | Err(nb::Error::Other(e)) => return Err(When::AwaitingAck.what(crate::error::What::Transport(e))),
    }
  }
}

/// Send an empty ACK carrying the received message-id.
fn send_ack<E: DatagramEndpoint, C: MessageCodec>(endpoint: &mut E, codec: &C, id: MessageId) {
  let Ok(bytes) = codec.encode_empty_ack(id) else { return };
  let _ = endpoint.send(&bytes);
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

/// Minimal format-error reset: best-effort, silently dropped on any
/// further failure.
fn format_error_reset<E: DatagramEndpoint, C: MessageCodec>(endpoint: &mut E, codec: &C, id: MessageId) {
  log::warn!("format error in received datagram, sending reset for recovered id");
  let Ok(bytes) = codec.encode_reset(id) else { return };
  let _ = endpoint.send(&bytes);
}
