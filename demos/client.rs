//! Point this at a CoAP server listening on localhost and watch a CON
//! request, a NON request, and a deliberately-doomed NON request (to a
//! host that drops traffic) play out.
//!
//! Needs a wire codec; this demo defines the bare minimum one inline
//! since this crate intentionally doesn't ship one (see [`coap_exchange::codec`]).

use coap_exchange::codec::{CodecError, MessageCodec};
use coap_exchange::message::{Code, Message, MessageId, Token, Type};
use coap_exchange::{std_platform, ClientResultExt, Config};

struct DemoCodec;

fn ty_bits(ty: Type) -> u8 {
  match ty {
    | Type::Con => 0,
    | Type::Non => 1,
    | Type::Ack => 2,
    | Type::Reset => 3,
  }
}

fn bits_ty(bits: u8) -> Option<Type> {
  match bits {
    | 0 => Some(Type::Con),
    | 1 => Some(Type::Non),
    | 2 => Some(Type::Ack),
    | 3 => Some(Type::Reset),
    | _ => None,
  }
}

impl MessageCodec for DemoCodec {
  fn encode(&self, msg: &Message) -> Result<Vec<u8>, CodecError> {
    let tkl = msg.token.as_bytes().len() as u8;
    let mut out = vec![(1 << 6) | (ty_bits(msg.ty) << 4) | tkl,
                        (msg.code.class << 5) | msg.code.detail,
                        (msg.id.0 >> 8) as u8,
                        (msg.id.0 & 0xff) as u8];
    out.extend_from_slice(msg.token.as_bytes());
    Ok(out)
  }

  fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError> {
    if bytes.len() < 4 {
      return Err(CodecError::Malformed);
    }

    let tkl = (bytes[0] & 0x0f) as usize;
    let ty = bits_ty((bytes[0] >> 4) & 0x03).ok_or(CodecError::Malformed)?;
    let id = MessageId(((bytes[2] as u16) << 8) | bytes[3] as u16);

    if bytes.len() < 4 + tkl {
      return Err(CodecError::BadMessage { id });
    }

    let code = Code::new(bytes[1] >> 5, bytes[1] & 0x1f);
    let token = Token::from_bytes(&bytes[4..4 + tkl]);

    Ok(Message { ty, code, id, token, raw: bytes.to_vec() })
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

fn get(path: &str) -> Message {
  Message { ty: Type::Con,
            code: Code::new(0, 1),
            id: MessageId(0),
            token: Token::default(),
            raw: vec![] }
  .with_path(path)
}

trait WithPath {
  fn with_path(self, _path: &str) -> Self;
}

impl WithPath for Message {
  fn with_path(self, _path: &str) -> Self {
    // Path would normally be carried as a Uri-Path option; this demo's
    // codec doesn't round-trip options at all, so the path only shows
    // up in the log line below.
    self
  }
}

fn main() {
  simple_logger::init_with_level(log::Level::Info).unwrap();

  let mut client = std_platform::connect("127.0.0.1", 5683, Config::default(), DemoCodec).unwrap();

  log::info!("CON GET /hello");
  let mut req = get("hello");
  req.ty = Type::Con;
  match client.exchange(req) {
    | Ok(resp) => log::info!("ok! {:?}", resp.code),
    | Err(e) => log::error!("error! {:?}", e),
  }

  log::info!("NON GET /hello");
  let mut req = get("hello");
  req.ty = Type::Non;
  match client.exchange(req) {
    | Ok(resp) => log::info!("ok! {:?}", resp.code),
    | Err(e) => log::error!("error! {:?}", e),
  }

  log::info!("NON GET /black_hole");
  let mut req = get("black_hole");
  req.ty = Type::Non;
  match client.exchange(req).timeout_ok() {
    | Ok(None) => log::info!("ok! did not receive a response"),
    | Ok(Some(resp)) => log::info!("ok! {:?}", resp.code),
    | Err(e) => log::error!("error! {:?}", e),
  }
}
