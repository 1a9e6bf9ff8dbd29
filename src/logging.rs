//! Small helpers for summarizing a message for a `log::debug!`/`log::warn!`
//! call site without formatting the full (possibly large) raw datagram.
//!
//! Uses a plain heap `String` rather than a fixed-capacity buffer, since
//! this core is `std`-only.

use crate::message::Message;

/// A short, human-readable summary of a message's header fields, fit for
/// a single log line: type, code, message id, token length, and how many
/// raw bytes it occupies on the wire.
pub(crate) fn msg_summary(msg: &Message) -> String {
  format!("{:?} {:?} id={} token_len={} ({} bytes)",
          msg.ty,
          msg.code,
          msg.id.0,
          msg.token.as_bytes().len(),
          msg.raw.len())
}
