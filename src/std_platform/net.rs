use std::io;
use std::net::UdpSocket;

use crate::net::DatagramEndpoint;

fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// A non-blocking, `connect`-ed `UdpSocket`.
pub struct UdpEndpoint {
  sock: UdpSocket,
}

impl UdpEndpoint {
  /// Bind an ephemeral local socket and connect it to `(host, port)`.
  /// `host` is parsed as a literal IP address; no name resolution is
  /// attempted.
  pub fn connect(host: &str, port: u16) -> io::Result<Self> {
    let addr: std::net::IpAddr =
      host.parse().map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "host is not an IP literal"))?;

    let local = match addr {
      | std::net::IpAddr::V4(_) => "0.0.0.0:0",
      | std::net::IpAddr::V6(_) => "[::]:0",
    };

    let sock = UdpSocket::bind(local)?;
    sock.connect((addr, port))?;
    sock.set_nonblocking(true)?;

    Ok(UdpEndpoint { sock })
  }
}

impl DatagramEndpoint for UdpEndpoint {
  type Error = io::Error;

  fn send(&mut self, dgram: &[u8]) -> nb::Result<(), Self::Error> {
    self.sock.send(dgram).map(|_| ()).map_err(io_to_nb)
  }

  fn recv(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
    self.sock.recv(buf).map_err(io_to_nb)
  }
}
