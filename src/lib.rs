//! Client-side CoAP (RFC 7252) request/response exchange core.
//!
//! Drives one request through to a terminal outcome — a delivered
//! response, a connection reset, or a timeout — handling the
//! exponential-backoff retransmission of Confirmable requests, the
//! three legal shapes a response may take (piggy-backed ACK, separate
//! Confirmable, separate Non-confirmable), and rejection of spurious or
//! malformed traffic along the way.
//!
//! Wire encoding, the datagram transport, and the countdown timer are
//! external collaborators, modeled as the [`codec::MessageCodec`],
//! [`net::DatagramEndpoint`], and [`time::CountdownTimer`] traits
//! respectively — this crate only implements the state machine and,
//! behind the `std` feature, one concrete set of collaborators atop
//! `std::net::UdpSocket`.
//!
//! Out of scope: observe/subscribe, block-wise transfer, DTLS, multicast,
//! proxying, server-side behavior, connection pooling, and pipelining
//! multiple outstanding exchanges on one [`client::Client`].

#![deny(missing_docs)]

pub mod classify;
pub mod client;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
mod logging;
pub mod message;
pub mod net;
pub mod retry;
pub mod time;

mod confirmable;
mod nonconfirmable;

#[cfg(feature = "std")]
pub mod std_platform;

pub use client::{Client, ClientConfig, ClientResultExt};
pub use config::Config;
pub use error::Error;
pub use message::Message;
