use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::ScraperConfig;

/// What a single attempt produced. Transient and permanent failures may carry
/// different error types.
#[derive(Debug)]
pub enum Attempt<T, E, A = E> {
    Done(T),
    /// Transient failure; try again if attempts remain.
    Retry(E),
    /// Permanent failure; stop immediately.
    Abort(A),
}

#[derive(Debug)]
pub enum RetryOutcome<T, E, A = E> {
    Success { value: T, attempts: u32 },
    Aborted { error: A, attempts: u32 },
    Exhausted { error: E, attempts: u32 },
}

impl<T, E, A> RetryOutcome<T, E, A> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            RetryOutcome::Success { value, .. } => Some(value),
            _ => None,
        }
    }
}

type SleepFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// Fixed-delay retry loop shared by every network fetch.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    sleep: SleepFn,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            sleep: Arc::new(thread::sleep),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }

    /// Replaces the blocking wait between attempts.
    pub fn with_sleeper<S>(mut self, sleep: S) -> Self
    where
        S: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleep = Arc::new(sleep);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` (called with the 1-based attempt number) until it finishes,
    /// aborts, or the attempt budget is spent. There is no wait after the
    /// final attempt.
    pub fn run<T, E, A, F>(&self, label: &str, mut op: F) -> RetryOutcome<T, E, A>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Attempt<T, E, A>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Attempt::Done(value) => {
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    };
                }
                Attempt::Abort(error) => {
                    return RetryOutcome::Aborted {
                        error,
                        attempts: attempt,
                    };
                }
                Attempt::Retry(error) => {
                    warn!(
                        "failed to fetch {label}: {error} (attempt {attempt}/{})",
                        self.max_attempts
                    );
                    if attempt >= self.max_attempts {
                        return RetryOutcome::Exhausted {
                            error,
                            attempts: attempt,
                        };
                    }
                    info!("retrying in {} seconds", self.delay.as_secs());
                    (self.sleep)(self.delay);
                    attempt += 1;
                }
            }
        }
    }
}
