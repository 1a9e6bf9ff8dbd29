use std::time::{Duration, Instant};

use crate::time::CountdownTimer;

/// A one-shot countdown timer backed by `std::time::Instant`, polled
/// cooperatively rather than backed by an OS timer descriptor.
pub struct InstantTimer {
  deadline: Option<Instant>,
}

impl InstantTimer {
  /// An unarmed timer.
  pub fn new() -> Self {
    InstantTimer { deadline: None }
  }
}

impl Default for InstantTimer {
  fn default() -> Self {
    Self::new()
  }
}

impl CountdownTimer for InstantTimer {
  type Error = core::convert::Infallible;

  fn start(&mut self, dur: Duration) -> Result<(), Self::Error> {
    self.deadline = Some(Instant::now() + dur);
    Ok(())
  }

  fn poll(&mut self) -> nb::Result<(), Self::Error> {
    match self.deadline {
      | Some(d) if Instant::now() >= d => Ok(()),
      | Some(_) => Err(nb::Error::WouldBlock),
      | None => Err(nb::Error::WouldBlock),
    }
  }
}
