//! Pure classification of an inbound datagram against the outstanding
//! request, independent of any socket or timer.
//!
//! This is the `ReceiveClassifier` piece of the design: rather than
//! inlining the match/reject/ack decision tree inside each path's poll
//! loop (as the C source does, twice, once per loop), it is factored out
//! into one pure function so it can be unit-tested without any transport
//! at all.

use crate::message::{Message, MessageId, Token, Type};

/// What an exchange path should do in response to a classified datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  /// The message is a response matching our token; hand it to the
  /// caller as-is (it was delivered NON, or CON after the ACK already
  /// arrived).
  Deliver,
  /// The message is a response matching our token, delivered as a
  /// Confirmable message that itself needs an empty ACK sent back.
  DeliverAndAck,
  /// The message is our ACK (bare, matching message-id, no token): move
  /// from awaiting-ack to awaiting-response.
  AckReceived,
  /// The server reset our exchange; terminate with `ConnectionReset`.
  Reset,
  /// The datagram doesn't belong to this exchange (wrong token/id, or a
  /// message we don't expect); reject it and keep waiting.
  Drop,
  /// The datagram failed to parse; attempt the minimal format-error
  /// reset and keep waiting.
  FormatErrorReset,
}

/// Classify a successfully-decoded inbound message against the
/// outstanding request's message-id and token.
///
/// `awaiting_ack` distinguishes Phase A (still waiting on the bare ACK)
/// from Phase B / the NON path (waiting on the response itself), since a
/// bare ACK is only meaningful in Phase A.
pub fn classify(req_id: MessageId, req_token: &Token, awaiting_ack: bool, received: &Message) -> Action {
  if awaiting_ack && received.id == req_id && received.ty == Type::Ack && received.is_empty() {
    return Action::AckReceived;
  }

  if received.id == req_id && received.ty == Type::Reset {
    return Action::Reset;
  }

  if received.token_matches(req_token) {
    return match received.ty {
      | Type::Non => Action::Deliver,
      | Type::Con => Action::DeliverAndAck,
      // A piggy-backed ACK (non-empty, token-matching) is also just a
      // delivered response; it already satisfied Phase A by virtue of
      // sharing the request's message-id, handled by the caller before
      // classify() is reached for that case.
      | Type::Ack => Action::Deliver,
      | Type::Reset => Action::Drop,
    };
  }

  Action::Drop
}

/// Decide what to emit, if anything, for a datagram that matched
/// [`Action::Drop`]: a Reset for Confirmable traffic, nothing for
/// Non-confirmable. ACK/RST are never "rejected" this way — they're
/// simply consumed, which `classify` already reflects by only ever
/// returning `Drop` for message types where a reject response is
/// meaningful to construct.
pub fn reject_response(rejected: &Message) -> Option<MessageId> {
  match rejected.ty {
    | Type::Con => Some(rejected.id),
    | Type::Non | Type::Ack | Type::Reset => None,
  }
}

#[cfg(test)]
mod test {
  use tinyvec::ArrayVec;

  use super::*;
  use crate::message::Code;

  fn msg(ty: Type, id: u16, token: &[u8]) -> Message {
    Message { ty,
              code: Code::new(2, 5),
              id: MessageId(id),
              token: Token(ArrayVec::from_iter(token.iter().copied())),
              raw: vec![] }
  }

  fn empty_ack(id: u16) -> Message {
    Message { ty: Type::Ack,
              code: Code::EMPTY,
              id: MessageId(id),
              token: Token::default(),
              raw: vec![] }
  }

  #[test]
  fn bare_ack_while_awaiting_ack_is_ack_received() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    let action = classify(MessageId(42), &tok, true, &empty_ack(42));
    assert_eq!(action, Action::AckReceived);
  }

  #[test]
  fn bare_ack_while_awaiting_response_is_dropped() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    // Already in Phase B: a bare ACK can't match (token is empty) so it's a Drop.
    let action = classify(MessageId(42), &tok, false, &empty_ack(42));
    assert_eq!(action, Action::Drop);
  }

  #[test]
  fn matching_reset_terminates() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    let rst = Message { ty: Type::Reset,
                        code: Code::EMPTY,
                        id: MessageId(42),
                        token: Token::default(),
                        raw: vec![] };
    assert_eq!(classify(MessageId(42), &tok, true, &rst), Action::Reset);
  }

  #[test]
  fn non_response_with_matching_token_delivers() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    let resp = msg(Type::Non, 999, &[1, 2, 3, 4]);
    assert_eq!(classify(MessageId(42), &tok, false, &resp), Action::Deliver);
  }

  #[test]
  fn con_response_with_matching_token_delivers_and_acks() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    let resp = msg(Type::Con, 999, &[1, 2, 3, 4]);
    assert_eq!(classify(MessageId(42), &tok, false, &resp),
               Action::DeliverAndAck);
  }

  #[test]
  fn piggybacked_ack_delivers() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    let resp = msg(Type::Ack, 42, &[1, 2, 3, 4]);
    assert_eq!(classify(MessageId(42), &tok, true, &resp), Action::Deliver);
  }

  #[test]
  fn non_matching_token_is_dropped() {
    let tok = Token::from_bytes(&[1, 2, 3, 4]);
    let resp = msg(Type::Non, 999, &[9, 9, 9, 9]);
    assert_eq!(classify(MessageId(42), &tok, false, &resp), Action::Drop);
  }

  #[test]
  fn reject_response_is_reset_only_for_con() {
    let con = msg(Type::Con, 7, &[0; 4]);
    let non = msg(Type::Non, 8, &[0; 4]);
    assert_eq!(reject_response(&con), Some(MessageId(7)));
    assert_eq!(reject_response(&non), None);
  }
}
