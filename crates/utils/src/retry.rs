// This file is part of AAKit.
//
// AAKit is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// AAKit is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with AAKit.
// If not, see https://www.gnu.org/licenses/.

//! Retrying fallible async operations with exponential backoff and jitter

use std::{fmt::Debug, future::Future, time::Duration};

use rand::Rng;
use tokio::time;
use tracing::warn;

/// Backoff settings for [`with_retries`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryOpts {
    /// Maximum number of attempts, including the first one. Zero is treated as one.
    pub max_attempts: u64,
    /// The first retry happens right after the first failure (plus jitter),
    /// later retries wait at least this long.
    pub min_nonzero_wait: Duration,
    /// Upper bound on the wait between attempts
    pub max_wait: Duration,
    /// Upper bound on the random jitter added to each wait
    pub max_jitter: Duration,
}

impl Default for RetryOpts {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            min_nonzero_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryOpts {
    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        rand::thread_rng().gen_range(Duration::ZERO..self.max_jitter)
    }
}

/// Run `func` until it succeeds or the attempts run out, returning the last error.
pub async fn with_retries<Func, Fut, Out, Err>(
    description: &str,
    func: Func,
    opts: RetryOpts,
) -> Result<Out, Err>
where
    Func: Fn() -> Fut,
    Fut: Future<Output = Result<Out, Err>>,
    Err: Debug,
{
    let max_attempts = opts.max_attempts.max(1);
    let mut next_wait = Duration::ZERO;
    let mut attempt = 1;
    loop {
        let error = match func().await {
            Ok(out) => return Ok(out),
            Err(error) => error,
        };
        if attempt >= max_attempts {
            warn!("Failed to {description} after {attempt} attempts: {error:?}");
            return Err(error);
        }
        warn!("Failed to {description} (attempt {attempt}): {error:?}");

        // thread_rng is not Send, draw jitter before the await
        let wait = next_wait + opts.jitter();
        time::sleep(wait).await;
        next_wait = (2 * next_wait).clamp(opts.min_nonzero_wait, opts.max_wait);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    fn fast_opts(max_attempts: u64) -> RetryOpts {
        RetryOpts {
            max_attempts,
            min_nonzero_wait: Duration::from_millis(10),
            max_wait: Duration::from_millis(40),
            max_jitter: Duration::ZERO,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let calls = AtomicU64::new(0);
        let res: Result<u64, &str> = with_retries(
            "count",
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err("not yet")
                } else {
                    Ok(n)
                }
            },
            fast_opts(5),
        )
        .await;
        assert_eq!(res, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error() {
        let calls = AtomicU64::new(0);
        let res: Result<(), u64> = with_retries(
            "fail",
            || async { Err(calls.fetch_add(1, Ordering::SeqCst)) },
            fast_opts(4),
        )
        .await;
        assert_eq!(res, Err(3));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_runs_once() {
        let calls = AtomicU64::new(0);
        let res: Result<(), ()> = with_retries(
            "fail",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(())
            },
            fast_opts(0),
        )
        .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
