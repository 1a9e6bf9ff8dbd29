//! The header-level view of a CoAP message that this core actually touches.
//!
//! This core is deliberately ignorant of options and payload — those are
//! the concern of the [`crate::codec::MessageCodec`] collaborator.
//! `Message` here carries only type, code, message ID, and token, plus
//! whatever opaque bytes the codec produced (kept around so a
//! retransmit can resend the exact bytes that were first sent, without
//! re-encoding).

use tinyvec::ArrayVec;

/// Indicates if this message is Confirmable, Non-confirmable,
/// Acknowledgement, or Reset.
///
/// See [RFC7252 §3](https://datatracker.ietf.org/doc/html/rfc7252#section-3).
#[derive(Copy, Clone, Hash, Eq, Ord, PartialEq, PartialOrd, Debug)]
pub enum Type {
  /// Confirmable: requires an ACK or RST in reply.
  Con,
  /// Non-confirmable: no transport-layer reply required.
  Non,
  /// Acknowledgement of a Confirmable message, possibly carrying a
  /// piggy-backed response.
  Ack,
  /// Reset: the received message could not be processed.
  Reset,
}

/// The coarse classification of a message's code, per RFC 7252 §5.9 /
/// this core's needs: is it a request, a response, or the empty code
/// used by bare ACKs and RSTs?
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum CodeClass {
  /// Code `0.00`, used by empty ACK/RST messages.
  Empty,
  /// Code class `0`, method codes (GET/POST/PUT/DELETE/...).
  Request,
  /// Code classes `2`/`4`/`5`, response status codes.
  Response,
}

/// A `class.detail` CoAP response/request code, e.g. `2.05` or `0.01`.
#[derive(Copy, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Debug)]
pub struct Code {
  /// The code class (`0` for requests, `2`/`4`/`5` for responses).
  pub class: u8,
  /// The code detail.
  pub detail: u8,
}

impl Code {
  /// The empty code (`0.00`), used by bare ACK/RST messages.
  pub const EMPTY: Code = Code { class: 0, detail: 0 };

  /// Construct a new code from a class and detail.
  pub const fn new(class: u8, detail: u8) -> Self {
    Code { class, detail }
  }

  /// Classify this code as empty, a request, or a response.
  pub fn kind(&self) -> CodeClass {
    match self.class {
      | 0 if self.detail == 0 => CodeClass::Empty,
      | 0 => CodeClass::Request,
      | 2 | 4 | 5 => CodeClass::Response,
      | _ => CodeClass::Response,
    }
  }
}

/// 16-bit Message-ID, network byte order on the wire.
///
/// Used to detect message duplication and to match ACK/RST messages to
/// the CON/NON message that elicited them. Independent of [`Token`] — see
/// the module docs for the distinction CoAP draws between the two.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct MessageId(pub u16);

/// 0-8 byte end-to-end correlator, chosen by the requester and echoed
/// verbatim by the responder. This core always generates an exactly
/// 4-byte token (see [`crate::config::TOKEN_LEN`]), but a `Token` received
/// from the wire may carry any length 0..=8 and must still compare
/// correctly against ours.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Build a token from a byte slice (length 0..=8).
  pub fn from_bytes(bytes: &[u8]) -> Self {
    Token(ArrayVec::from_iter(bytes.iter().copied()))
  }

  /// Borrow the token's bytes.
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }
}

/// A CoAP message, reduced to the header fields the exchange core acts
/// on. `raw` holds the codec-produced wire bytes so a retransmit can
/// resend verbatim without re-encoding (and so a test harness can inspect
/// exactly what went out on the wire).
#[derive(Clone, Debug, Default)]
pub struct Message {
  /// The message type.
  pub ty: Type,
  /// The message code.
  pub code: Code,
  /// The message ID.
  pub id: MessageId,
  /// The token.
  pub token: Token,
  /// The encoded bytes of this message, as produced by the codec.
  pub raw: Vec<u8>,
}

impl Default for Type {
  fn default() -> Self {
    Type::Con
  }
}

impl Default for Code {
  fn default() -> Self {
    Code::EMPTY
  }
}

impl Default for MessageId {
  fn default() -> Self {
    MessageId(0)
  }
}

impl Message {
  /// Is this the empty message used by bare ACKs (and some RSTs)? Type
  /// ACK, code `0.00`, no token (options/payload are the codec's
  /// concern, not represented here).
  pub fn is_empty(&self) -> bool {
    self.ty == Type::Ack && self.code == Code::EMPTY && self.token.as_bytes().is_empty()
  }

  /// Does this message's token match `other`? Byte-equal comparison
  /// including length.
  pub fn token_matches(&self, other: &Token) -> bool {
    &self.token == other
  }
}
