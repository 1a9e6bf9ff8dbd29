//! A minimal, test-only wire codec and loopback "server" harness.
//!
//! The codec here only round-trips the header fields the core actually
//! touches (version/type/TKL byte, code byte, message-id, token) — no
//! options, no payload — matching the fact that the core never looks at
//! either.

use std::net::UdpSocket;
use std::time::Duration;

use coap_exchange::codec::{CodecError, MessageCodec};
use coap_exchange::message::{Code, Message, MessageId, Token, Type};

pub struct HeaderOnlyCodec;

fn ty_to_bits(ty: Type) -> u8 {
  match ty {
    | Type::Con => 0,
    | Type::Non => 1,
    | Type::Ack => 2,
    | Type::Reset => 3,
  }
}

fn bits_to_ty(bits: u8) -> Option<Type> {
  match bits {
    | 0 => Some(Type::Con),
    | 1 => Some(Type::Non),
    | 2 => Some(Type::Ack),
    | 3 => Some(Type::Reset),
    | _ => None,
  }
}

impl MessageCodec for HeaderOnlyCodec {
  fn encode(&self, msg: &Message) -> Result<Vec<u8>, CodecError> {
    let tkl = msg.token.as_bytes().len() as u8;
    let mut out = Vec::with_capacity(4 + tkl as usize);
    out.push((1 << 6) | (ty_to_bits(msg.ty) << 4) | tkl);
    out.push((msg.code.class << 5) | msg.code.detail);
    out.extend_from_slice(&msg.id.0.to_be_bytes());
    out.extend_from_slice(msg.token.as_bytes());
    Ok(out)
  }

  fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError> {
    if bytes.len() < 4 {
      return Err(CodecError::Malformed);
    }

    let tkl = (bytes[0] & 0x0F) as usize;
    let ty_bits = (bytes[0] >> 4) & 0x3;
    let id = MessageId(u16::from_be_bytes([bytes[2], bytes[3]]));

    let Some(ty) = bits_to_ty(ty_bits) else {
      return Err(CodecError::BadMessage { id });
    };

    if bytes.len() < 4 + tkl {
      return Err(CodecError::BadMessage { id });
    }

    let code = Code::new(bytes[1] >> 5, bytes[1] & 0x1F);
    let token = Token::from_bytes(&bytes[4..4 + tkl]);

    Ok(Message { ty,
                 code,
                 id,
                 token,
                 raw: bytes.to_vec() })
  }

  fn encode_reset(&self, id: MessageId) -> Result<Vec<u8>, CodecError> {
    self.encode(&Message { ty: Type::Reset,
                            code: Code::EMPTY,
                            id,
                            token: Token::default(),
                            raw: vec![] })
  }

  fn encode_empty_ack(&self, id: MessageId) -> Result<Vec<u8>, CodecError> {
    self.encode(&Message { ty: Type::Ack,
                            code: Code::EMPTY,
                            id,
                            token: Token::default(),
                            raw: vec![] })
  }
}

/// A loopback UDP "server" under test control: bound once, exposes its
/// port, and lets a test script the exact bytes and timing of replies.
pub struct StubServer {
  sock: UdpSocket,
  peer: std::cell::Cell<Option<std::net::SocketAddr>>,
}

impl StubServer {
  pub fn bind() -> Self {
    let sock = UdpSocket::bind("127.0.0.1:0").expect("bind stub server");
    sock.set_read_timeout(Some(Duration::from_secs(120))).unwrap();
    StubServer { sock, peer: std::cell::Cell::new(None) }
  }

  pub fn port(&self) -> u16 {
    self.sock.local_addr().unwrap().port()
  }

  /// Block until a datagram arrives, recording the sender so replies
  /// can be addressed back.
  pub fn recv(&self) -> Vec<u8> {
    let mut buf = [0u8; 1152];
    let (n, addr) = self.sock.recv_from(&mut buf).expect("recv request");
    self.peer.set(Some(addr));
    buf[..n].to_vec()
  }

  /// Try to receive a datagram without blocking past `timeout`; `None`
  /// if nothing arrived in that window.
  pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
    self.sock.set_read_timeout(Some(timeout)).unwrap();
    let mut buf = [0u8; 1152];
    let result = self.sock.recv_from(&mut buf);
    self.sock.set_read_timeout(Some(Duration::from_secs(120))).unwrap();
    match result {
      | Ok((n, addr)) => {
        self.peer.set(Some(addr));
        Some(buf[..n].to_vec())
      },
      | Err(_) => None,
    }
  }

  pub fn reply(&self, bytes: &[u8]) {
    let peer = self.peer.get().expect("recv() before reply()");
    self.sock.send_to(bytes, peer).expect("send reply");
  }
}
