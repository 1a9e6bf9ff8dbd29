//! A non-blocking timer that drives a fixed-delay or exponential-backoff
//! retry, living alongside whatever operation is being retried.
//!
//! Built directly on `std::time::Instant` rather than a clock-generic
//! abstraction, since this core targets `std` and has no need to stay
//! embedded-friendly.

use std::time::{Duration, Instant};

use rand::Rng;

/// A number of attempts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempts(pub u16);

/// Result of [`RetryTimer::what_should_i_do`]: whether a retry should be
/// attempted or attempts have been exhausted.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum YouShould {
  /// Attempts have been exhausted; give up.
  Cry,
  /// A retry should be performed now.
  Retry,
}

/// Strategy to employ when retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  /// Generate a random initial delay between `init_min` and `init_max`,
  /// then double it on every subsequent attempt.
  ///
  /// This is how the ACK timer (`ACK_TIMEOUT` + jitter, doubling per
  /// retransmit) is expressed.
  Exponential {
    /// Minimum (inclusive) delay before the first retry.
    init_min: Duration,
    /// Maximum (inclusive) delay before the first retry.
    init_max: Duration,
  },
  /// A constant delay between `min` and `max` (sampled once), which does
  /// not grow between attempts. Used for the fixed `RESP_TIMEOUT`
  /// deadline, which has no jitter (`min == max`) and no retry.
  Delay {
    /// Minimum (inclusive) delay.
    min: Duration,
    /// Maximum (inclusive) delay.
    max: Duration,
  },
}

impl Strategy {
  fn has_jitter(&self) -> bool {
    match self {
      | Strategy::Exponential { init_min, init_max } => init_min != init_max,
      | Strategy::Delay { min, max } => min != max,
    }
  }

  fn range_ms(&self) -> (u64, u64) {
    match self {
      | Strategy::Exponential { init_min, init_max } => {
        (init_min.as_millis() as u64, init_max.as_millis() as u64)
      },
      | Strategy::Delay { min, max } => (min.as_millis() as u64, max.as_millis() as u64),
    }
  }

  /// Total elapsed time since the first attempt once `attempt` retries
  /// have occurred, for the exponential strategy. Doubles at integer
  /// millisecond granularity to avoid floating point drift.
  const fn total_delay_exp(init_ms: u64, attempt: u16) -> u64 {
    init_ms * 2u64.pow(attempt.saturating_sub(1) as u32)
  }

  /// Total time this strategy will have spent if every attempt up to
  /// `max_attempts` is exhausted.
  pub fn max_time(&self, max_attempts: Attempts) -> Duration {
    let ms = match self {
      | Strategy::Exponential { .. } => {
        let (_, max_ms) = self.range_ms();
        Self::total_delay_exp(max_ms, max_attempts.0)
      },
      | Strategy::Delay { .. } => {
        let (_, max_ms) = self.range_ms();
        max_ms * max_attempts.0 as u64
      },
    };
    Duration::from_millis(ms)
  }
}

/// Tracks retry attempts against a fixed start time, answering "should I
/// retry yet?" on each poll without blocking.
#[derive(Debug, Clone, Copy)]
pub struct RetryTimer {
  start: Instant,
  init_ms: u64,
  strategy: Strategy,
  attempts: Attempts,
  max_attempts: Attempts,
}

impl RetryTimer {
  /// Create a new retry timer, sampling jitter (if the strategy has any)
  /// from the given RNG.
  pub fn new(start: Instant, strategy: Strategy, max_attempts: Attempts, rng: &mut impl Rng) -> Self {
    let init_ms = if strategy.has_jitter() {
      let (min, max) = strategy.range_ms();
      rng.gen_range(min..=max)
    } else {
      strategy.range_ms().0
    };

    Self { start,
           init_ms,
           strategy,
           max_attempts,
           attempts: Attempts(1) }
  }

  /// The delay used for the very first wait (including jitter).
  pub fn initial_delay(&self) -> Duration {
    Duration::from_millis(self.init_ms)
  }

  /// How many attempts have been made so far.
  pub fn attempts(&self) -> Attempts {
    self.attempts
  }

  /// Ask the timer what to do given the current time: retry, or give up.
  /// Returns `nb::Error::WouldBlock` if it's not yet time to retry.
  pub fn what_should_i_do(&mut self, now: Instant) -> nb::Result<YouShould, core::convert::Infallible> {
    if self.attempts >= self.max_attempts {
      Ok(YouShould::Cry)
    } else {
      let elapsed_ms = now.saturating_duration_since(self.start).as_millis() as u64;
      if self.is_ready(elapsed_ms, self.attempts.0) {
        self.attempts.0 += 1;
        Ok(YouShould::Retry)
      } else {
        Err(nb::Error::WouldBlock)
      }
    }
  }

  fn threshold_ms(&self, attempts: u16) -> u64 {
    if attempts == 0 {
      return 0;
    }

    match self.strategy {
      | Strategy::Delay { .. } => self.init_ms * attempts as u64,
      | Strategy::Exponential { .. } => Strategy::total_delay_exp(self.init_ms, attempts),
    }
  }

  fn is_ready(&self, elapsed_ms: u64, attempts: u16) -> bool {
    attempts == 0 || elapsed_ms >= self.threshold_ms(attempts)
  }

  /// Delay to re-arm the real countdown timer with after a retransmit,
  /// so the next fire lands on the next (doubled, for the exponential
  /// strategy) threshold rather than the fixed initial delay.
  ///
  /// Only meaningful right after `what_should_i_do` has returned
  /// `Ok(YouShould::Retry)`, since it reads `attempts` post-increment.
  pub fn next_delay(&self) -> Duration {
    let prev = self.attempts.0.saturating_sub(1);
    let gap = self.threshold_ms(self.attempts.0).saturating_sub(self.threshold_ms(prev));
    Duration::from_millis(gap.max(1))
  }

  /// Time remaining until the current threshold is reached, measured
  /// from `now`. Used to re-arm the real timer when it fired slightly
  /// ahead of this timer's own elapsed-time bookkeeping (`what_should_i_do`
  /// returned `WouldBlock`), rather than treating that as exhausted
  /// attempts.
  pub fn remaining(&self, now: Instant) -> Duration {
    let elapsed_ms = now.saturating_duration_since(self.start).as_millis() as u64;
    let threshold_ms = self.threshold_ms(self.attempts.0);
    Duration::from_millis(threshold_ms.saturating_sub(elapsed_ms).max(1))
  }
}

#[cfg(test)]
mod test {
  use std::time::Duration;

  use rand::rngs::mock::StepRng;

  use super::*;

  fn fake_now(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
  }

  #[test]
  fn delay_retrier() {
    let base = Instant::now();
    let mut rng = StepRng::new(0, 1);
    let mut retry = RetryTimer::new(base,
                                    Strategy::Delay { min: Duration::from_millis(1000),
                                                      max: Duration::from_millis(1000) },
                                    Attempts(5),
                                    &mut rng);

    assert_eq!(retry.what_should_i_do(fake_now(base, 999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(fake_now(base, 1000)).unwrap(),
               YouShould::Retry);

    assert_eq!(retry.what_should_i_do(fake_now(base, 1999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(fake_now(base, 2000)).unwrap(),
               YouShould::Retry);

    assert_eq!(retry.what_should_i_do(fake_now(base, 10_000)).unwrap(),
               YouShould::Retry);
    assert_eq!(retry.what_should_i_do(fake_now(base, 10_000)).unwrap(),
               YouShould::Retry);
    assert_eq!(retry.what_should_i_do(fake_now(base, 10_000)).unwrap(),
               YouShould::Cry);
  }

  #[test]
  fn exponential_retrier() {
    let base = Instant::now();
    let mut rng = StepRng::new(0, 1);
    let mut retry = RetryTimer::new(base,
                                    Strategy::Exponential { init_min: Duration::from_millis(1000),
                                                            init_max: Duration::from_millis(1000) },
                                    Attempts(6),
                                    &mut rng);

    assert_eq!(retry.what_should_i_do(fake_now(base, 999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(fake_now(base, 1000)).unwrap(),
               YouShould::Retry); // gap_0 = 1000ms

    assert_eq!(retry.what_should_i_do(fake_now(base, 1999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(fake_now(base, 2000)).unwrap(),
               YouShould::Retry); // gap_1 = 2000ms

    assert_eq!(retry.what_should_i_do(fake_now(base, 3999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(fake_now(base, 4000)).unwrap(),
               YouShould::Retry); // gap_2 = 4000ms

    assert_eq!(retry.what_should_i_do(fake_now(base, 8_000)).unwrap(),
               YouShould::Retry); // gap_3 = 8000ms
    assert_eq!(retry.what_should_i_do(fake_now(base, 16_000)).unwrap(),
               YouShould::Retry);
    assert_eq!(retry.what_should_i_do(fake_now(base, 16_000)).unwrap(),
               YouShould::Cry);
  }

  #[test]
  fn exp_calculation() {
    assert_eq!(Strategy::total_delay_exp(100, 1), 100);
    assert_eq!(Strategy::total_delay_exp(100, 2), 200);
    assert_eq!(Strategy::total_delay_exp(100, 3), 400);
  }

  #[test]
  fn jitter_drawn_within_range() {
    let base = Instant::now();
    let mut rng = StepRng::new(500, 0);
    let timer = RetryTimer::new(base,
                                Strategy::Exponential { init_min: Duration::from_secs(2),
                                                        init_max: Duration::from_millis(3000) },
                                Attempts(5),
                                &mut rng);
    let ms = timer.initial_delay().as_millis() as u64;
    assert!(ms >= 2000 && ms < 3000);
  }
}
