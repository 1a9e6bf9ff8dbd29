//! The `MessageCodec` trait: the external collaborator this core expects
//! to be handed a CoAP wire encoder/decoder through.
//!
//! The core never looks at options or payload — only the header fields
//! captured by [`crate::message::Message`] — so the codec's job is
//! narrowed accordingly: encode a `Message` to bytes, decode bytes to a
//! `Message`, and (critically for the format-error-reset path) parse
//! *just* the message-ID out of a datagram that otherwise fails to
//! decode, so a Reset can still be addressed correctly.

use crate::message::Message;

/// A decode failure. Distinguished from a transport failure: a
/// `CodecError` means bytes arrived but could not be interpreted, not
/// that the transport itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
  /// The datagram could not be parsed as a CoAP message at all (wrong
  /// version, truncated header, or similarly unrecoverable). The codec
  /// was not even able to recover a message-ID to reset against.
  Malformed,
  /// The datagram had a well-formed CoAP header (so its message-ID is
  /// trustworthy) but failed to parse beyond that — options, token
  /// length, or payload were invalid. This is the case the
  /// format-error-reset path is built for.
  BadMessage {
    /// The message-ID recovered from the otherwise-unparseable datagram,
    /// needed to address the Reset correctly.
    id: crate::message::MessageId,
  },
}

/// Encodes [`Message`]s to wire bytes and decodes wire bytes back into
/// `Message`s.
///
/// Implementors only need to round-trip the header fields `Message`
/// carries (type, code, message ID, token) faithfully; options and
/// payload are opaque to this core and may be round-tripped via
/// `Message::raw` however the implementor sees fit.
pub trait MessageCodec {
  /// Encode `msg` to wire bytes.
  fn encode(&self, msg: &Message) -> Result<Vec<u8>, CodecError>;

  /// Decode a datagram into a `Message`.
  fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError>;

  /// Build a bare Reset message (type RST, code `0.00`, no token) with
  /// message-id `id`.
  fn encode_reset(&self, id: crate::message::MessageId) -> Result<Vec<u8>, CodecError>;

  /// Build a bare empty ACK (type ACK, code `0.00`, no token) with
  /// message-id `id`, used to acknowledge a Confirmable message this
  /// core is not already responding to with a piggy-backed ACK.
  fn encode_empty_ack(&self, id: crate::message::MessageId) -> Result<Vec<u8>, CodecError>;
}
