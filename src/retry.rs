//! Bounded retry with backoff for remote operations.
//!
//! Local operations never go through a [`RetryPolicy`]; they run once and
//! surface their error directly.

use crate::{Result, StorageError};
use std::future::Future;
use std::time::Duration;

/// Maps a zero-based attempt index to a number of backoff units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
	/// `attempt + 1` units: 1, 2, 3, ...
	Linear,
	/// `2^attempt` units: 1, 2, 4, ...
	Exponential,
}

impl Backoff {
	/// Number of units to wait after the given failed attempt.
	pub fn units(self, attempt: u32) -> u32 {
		match self {
			Backoff::Linear => attempt.saturating_add(1),
			Backoff::Exponential => 2u32.saturating_pow(attempt),
		}
	}
}

/// Retry policy for a single remote operation invocation.
///
/// The attempt counter lives on the stack of [`RetryPolicy::run`]; nothing is
/// shared between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	max_attempts: u32,
	backoff: Backoff,
	unit: Duration,
}

impl RetryPolicy {
	/// Default attempt count for read operations.
	pub const DEFAULT_READ_ATTEMPTS: u32 = 3;
	/// Default attempt count for write operations.
	pub const DEFAULT_WRITE_ATTEMPTS: u32 = 5;

	/// Create a policy. `max_attempts` is clamped to at least one.
	pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
		Self {
			max_attempts: max_attempts.max(1),
			backoff,
			unit: Duration::from_secs(1),
		}
	}

	/// Read profile: 3 attempts, linear backoff.
	pub fn read() -> Self {
		Self::new(Self::DEFAULT_READ_ATTEMPTS, Backoff::Linear)
	}

	/// Write profile: 5 attempts, exponential backoff.
	pub fn write() -> Self {
		Self::new(Self::DEFAULT_WRITE_ATTEMPTS, Backoff::Exponential)
	}

	/// Replace the attempt ceiling, keeping the backoff profile.
	pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
		self.max_attempts = max_attempts.max(1);
		self
	}

	/// Replace the duration of one backoff unit (one second by default).
	pub fn with_unit(mut self, unit: Duration) -> Self {
		self.unit = unit;
		self
	}

	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	pub fn backoff(&self) -> Backoff {
		self.backoff
	}

	/// Delay before the attempt following the failed attempt `attempt`.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		self.unit.saturating_mul(self.backoff.units(attempt))
	}

	/// Run `operation` until it succeeds, fails permanently or runs out of
	/// attempts.
	///
	/// Non-retryable errors (including `NotFound`) are returned as-is after
	/// the attempt that produced them. Exhaustion yields
	/// [`StorageError::RetriesExhausted`] wrapping the last error. Backoff
	/// sleeps happen only between attempts.
	pub async fn run<T, F, Fut>(&self, name: &str, mut operation: F) -> Result<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let mut attempt = 0;
		loop {
			match operation().await {
				Ok(value) => return Ok(value),
				Err(e) if !e.is_retryable() => return Err(e),
				Err(e) => {
					let attempts = attempt + 1;
					if attempts >= self.max_attempts {
						tracing::error!(
							operation = name,
							attempts,
							error = %e,
							"Giving up after exhausting retries"
						);
						return Err(StorageError::RetriesExhausted {
							operation: name.to_string(),
							attempts,
							source: Box::new(e),
						});
					}

					let delay = self.delay_for(attempt);
					tracing::warn!(
						operation = name,
						attempt = attempts,
						delay_ms = delay.as_millis() as u64,
						error = %e,
						"Attempt failed, retrying"
					);
					tokio::time::sleep(delay).await;
					attempt += 1;
				}
			}
		}
	}
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::read()
	}
}
