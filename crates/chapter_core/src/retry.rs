use std::time::Duration;

/// Retry policy for one logical fetch: a bound on the number of retries
/// and the cyclic table of waits between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries forever; the caller must be able to cancel externally.
    pub max_retries: Option<u32>,
    pub cycle: Vec<Duration>,
}

impl RetryPolicy {
    pub fn unlimited(cycle: Vec<Duration>) -> Self {
        Self {
            max_retries: None,
            cycle,
        }
    }

    pub fn bounded(max_retries: u32, cycle: Vec<Duration>) -> Self {
        Self {
            max_retries: Some(max_retries),
            cycle,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Some(20),
            cycle: [5, 10, 30, 60].iter().map(|s| Duration::from_secs(*s)).collect(),
        }
    }
}

/// Mutable retry state for a single logical fetch.
///
/// A fresh schedule is created per call and never shared across chapters.
#[derive(Debug)]
pub struct RetrySchedule<'a> {
    policy: &'a RetryPolicy,
    attempt: u32,
}

impl<'a> RetrySchedule<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Number of retries handed out so far.
    pub fn retries(&self) -> u32 {
        self.attempt
    }

    /// Wait before the next retry, or `None` once the retry budget is spent.
    ///
    /// The table repeats: retry `n` waits `cycle[n % cycle.len()]`, so the
    /// policy oscillates through a fixed sequence instead of growing without
    /// bound.
    pub fn next_wait(&mut self) -> Option<Duration> {
        if let Some(max) = self.policy.max_retries {
            if self.attempt >= max {
                return None;
            }
        }
        let wait = if self.policy.cycle.is_empty() {
            Duration::ZERO
        } else {
            self.policy.cycle[self.attempt as usize % self.policy.cycle.len()]
        };
        self.attempt = self.attempt.saturating_add(1);
        Some(wait)
    }
}
