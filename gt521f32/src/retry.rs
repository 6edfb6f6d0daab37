//! Bounded retry

use tracing::debug;

/// How a single attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Done, stop with success
    Success,

    /// Failed, another attempt may help
    Retry,

    /// Failed, further attempts are pointless
    Stop,
}

/// Result of a retried operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// Value of the last attempt
    pub value: T,

    /// Attempts made
    pub attempts: usize,

    /// Verdict of the last attempt
    pub verdict: Verdict,
}

impl<T> RetryOutcome<T> {
    pub fn succeeded(&self) -> bool {
        self.verdict == Verdict::Success
    }
}

/// Run an operation up to a fixed number of times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
}

impl RetryPolicy {
    /// Policy with `max_attempts` attempts, at least one
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Call `step` until `judge` reports success or stop, or attempts run out
    ///
    /// `step` receives the 1-based attempt number. The first success wins.
    /// Errors from `step` end the loop immediately and are never retried.
    pub fn run<T, E>(
        &self,
        mut step: impl FnMut(usize) -> Result<T, E>,
        judge: impl Fn(&T) -> Verdict,
    ) -> Result<RetryOutcome<T>, E> {
        let mut attempt = 1;

        loop {
            let value = step(attempt)?;
            let verdict = judge(&value);

            if verdict != Verdict::Retry || attempt == self.max_attempts {
                return Ok(RetryOutcome {
                    value,
                    attempts: attempt,
                    verdict,
                });
            }

            debug!("Attempt {}/{} failed, retrying", attempt, self.max_attempts);
            attempt += 1;
        }
    }
}
