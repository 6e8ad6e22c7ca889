//! Bounded retry around a single-attempt [`Transfer`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::shell;

use super::http::partial_path;
use super::Transfer;

/// How many times to attempt a download and how long to wait in between.
///
/// The wait is fixed, not exponential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Pause after each failed attempt except the last.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// A download that failed on every attempt.
#[derive(Debug, Clone, Error)]
#[error("Failed to fetch {url} after {attempts} attempt(s): {last_error}")]
pub struct FetchError {
    /// The URL that was requested.
    pub url: String,
    /// Number of attempts actually made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last_error: String,
}

/// Retry-wrapped downloader.
pub struct Fetcher {
    transfer: Box<dyn Transfer>,
    policy: RetryPolicy,
    sleep: fn(Duration),
    interrupted: fn() -> bool,
}

impl Fetcher {
    /// Create a fetcher that sleeps with [`std::thread::sleep`].
    pub fn new(transfer: Box<dyn Transfer>, policy: RetryPolicy) -> Self {
        Self {
            transfer,
            policy,
            sleep: std::thread::sleep,
            interrupted: shell::interrupted,
        }
    }

    /// Replace the sleep function (tests record backoffs instead of waiting).
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    /// Replace the SIGINT flag check.
    pub fn with_interrupt_check(mut self, interrupted: fn() -> bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Download `url` to `dest`.
    ///
    /// On success `dest` holds the complete body. On failure neither `dest`
    /// nor its staging file exist. After Ctrl-C no further attempt is made.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.fetch_checked(url, dest, None)
    }

    /// Download `url` to `dest` and require its SHA-256 to equal `sha256`.
    ///
    /// A mismatch counts as a failed attempt.
    pub fn fetch_verified(&self, url: &str, dest: &Path, sha256: &str) -> Result<(), FetchError> {
        self.fetch_checked(url, dest, Some(sha256))
    }

    fn fetch_checked(
        &self,
        url: &str,
        dest: &Path,
        sha256: Option<&str>,
    ) -> Result<(), FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if (self.interrupted)() {
                return Err(FetchError {
                    url: url.to_string(),
                    attempts: attempt - 1,
                    last_error: "interrupted".to_string(),
                });
            }
            debug!("Fetching {} (attempt {}/{})", url, attempt, max_attempts);

            let outcome = self.transfer.transfer(url, dest).and_then(|()| match sha256 {
                Some(expected) => verify_sha256(dest, expected),
                None => Ok(()),
            });

            match outcome {
                Ok(()) => return Ok(()),
                Err(e) => {
                    discard(dest);
                    last_error = format!("{:#}", e);
                    warn!(
                        "Fetch of {} failed (attempt {}/{}): {}",
                        url, attempt, max_attempts, last_error
                    );
                    if attempt < max_attempts && !(self.interrupted)() {
                        (self.sleep)(self.policy.backoff);
                    }
                }
            }
        }

        Err(FetchError {
            url: url.to_string(),
            attempts: max_attempts,
            last_error,
        })
    }
}

/// Check the SHA-256 of the file at `path` against a hex digest.
pub fn verify_sha256(path: &Path, expected: &str) -> anyhow::Result<()> {
    let bytes = fs::read(path)?;
    let actual = hex::encode(Sha256::digest(&bytes));
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        anyhow::bail!("checksum mismatch: expected {}, got {}", expected, actual)
    }
}

// A failed attempt may have left a whole-but-wrong file (checksum mismatch)
// or a staging file from a transfer that did not clean up after itself.
fn discard(dest: &Path) {
    let _ = fs::remove_file(dest);
    let _ = fs::remove_file(partial_path(dest));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Fails the first `failures` attempts, leaving a half-written file
    /// behind each time, then writes `body`.
    struct FlakyTransfer {
        failures: u32,
        body: &'static str,
        calls: Rc<Cell<u32>>,
    }

    impl Transfer for FlakyTransfer {
        fn transfer(&self, _url: &str, dest: &Path) -> anyhow::Result<()> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n <= self.failures {
                fs::write(dest, "partial")?;
                anyhow::bail!("connection reset");
            }
            fs::write(dest, self.body)?;
            Ok(())
        }
    }

    fn no_sleep(_: Duration) {}

    fn fetcher(failures: u32, calls: &Rc<Cell<u32>>) -> Fetcher {
        let transfer = FlakyTransfer {
            failures,
            body: "echo installed",
            calls: Rc::clone(calls),
        };
        Fetcher::new(Box::new(transfer), RetryPolicy::default()).with_sleep(no_sleep)
    }

    #[test]
    fn default_policy_is_three_attempts_two_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(2));
    }

    #[test]
    fn first_success_makes_one_attempt() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));

        fetcher(0, &calls).fetch("https://example.test/install.sh", &dest).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "echo installed");
    }

    #[test]
    fn recovers_after_transient_failures() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));

        fetcher(2, &calls).fetch("https://example.test/install.sh", &dest).unwrap();

        assert_eq!(calls.get(), 3);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "echo installed");
    }

    #[test]
    fn always_failing_source_is_attempted_exactly_max_attempts() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));

        let err = fetcher(u32::MAX, &calls)
            .fetch("https://example.test/install.sh", &dest)
            .unwrap_err();

        assert_eq!(calls.get(), 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(err.url, "https://example.test/install.sh");
        assert!(err.last_error.contains("connection reset"));
    }

    #[test]
    fn failed_fetch_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));

        let _ = fetcher(u32::MAX, &calls).fetch("https://example.test/install.sh", &dest);

        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn custom_attempt_count_is_honored() {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let transfer = FlakyTransfer {
            failures: u32::MAX,
            body: "",
            calls: Rc::clone(&calls),
        };
        let fetcher = Fetcher::new(Box::new(transfer), RetryPolicy::new(5, Duration::ZERO))
            .with_sleep(no_sleep);

        let err = fetcher
            .fetch("https://example.test/a", &temp.path().join("a"))
            .unwrap_err();

        assert_eq!(calls.get(), 5);
        assert_eq!(err.attempts, 5);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let transfer = FlakyTransfer {
            failures: u32::MAX,
            body: "",
            calls: Rc::clone(&calls),
        };
        let fetcher = Fetcher::new(Box::new(transfer), RetryPolicy::new(0, Duration::ZERO))
            .with_sleep(no_sleep);

        let err = fetcher
            .fetch("https://example.test/a", &temp.path().join("a"))
            .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert_eq!(err.attempts, 1);
    }

    static CTRL_C: AtomicBool = AtomicBool::new(false);

    fn ctrl_c_pressed() -> bool {
        CTRL_C.load(Ordering::SeqCst)
    }

    /// Fails as if the user pressed Ctrl-C while the download was running.
    struct CancelledTransfer {
        calls: Rc<Cell<u32>>,
    }

    impl Transfer for CancelledTransfer {
        fn transfer(&self, _url: &str, _dest: &Path) -> anyhow::Result<()> {
            self.calls.set(self.calls.get() + 1);
            CTRL_C.store(true, Ordering::SeqCst);
            anyhow::bail!("connection closed")
        }
    }

    thread_local! {
        static SLEPT_AFTER_CTRL_C: RefCell<Vec<Duration>> = const { RefCell::new(Vec::new()) };
    }

    fn record_sleep_after_ctrl_c(d: Duration) {
        SLEPT_AFTER_CTRL_C.with(|s| s.borrow_mut().push(d));
    }

    #[test]
    fn ctrl_c_during_download_stops_retrying() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));
        let fetcher = Fetcher::new(
            Box::new(CancelledTransfer {
                calls: Rc::clone(&calls),
            }),
            RetryPolicy::default(),
        )
        .with_sleep(record_sleep_after_ctrl_c)
        .with_interrupt_check(ctrl_c_pressed);

        let err = fetcher
            .fetch("https://example.test/install.sh", &dest)
            .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert_eq!(err.attempts, 1);
        assert_eq!(err.last_error, "interrupted");
        assert!(SLEPT_AFTER_CTRL_C.with(|s| s.borrow().is_empty()));
        assert!(!dest.exists());
    }

    thread_local! {
        static SLEPT: RefCell<Vec<Duration>> = const { RefCell::new(Vec::new()) };
    }

    fn record_sleep(d: Duration) {
        SLEPT.with(|s| s.borrow_mut().push(d));
    }

    #[test]
    fn backoff_is_fixed_and_skipped_after_last_attempt() {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let transfer = FlakyTransfer {
            failures: u32::MAX,
            body: "",
            calls: Rc::clone(&calls),
        };
        let fetcher = Fetcher::new(Box::new(transfer), RetryPolicy::default())
            .with_sleep(record_sleep);

        let _ = fetcher.fetch("https://example.test/a", &temp.path().join("a"));

        let slept = SLEPT.with(|s| s.borrow().clone());
        assert_eq!(slept, vec![Duration::from_secs(2), Duration::from_secs(2)]);
    }

    #[test]
    fn verified_fetch_accepts_matching_digest() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));
        let digest = hex::encode(Sha256::digest(b"echo installed"));

        fetcher(0, &calls)
            .fetch_verified("https://example.test/install.sh", &dest, &digest)
            .unwrap();

        assert!(dest.exists());
    }

    #[test]
    fn checksum_mismatch_counts_as_failed_attempt() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("install.sh");
        let calls = Rc::new(Cell::new(0));

        let err = fetcher(0, &calls)
            .fetch_verified("https://example.test/install.sh", &dest, "00ff")
            .unwrap_err();

        assert_eq!(calls.get(), 3);
        assert!(err.last_error.contains("checksum mismatch"));
        assert!(!dest.exists());
    }

    #[test]
    fn fetch_error_display_mentions_url_and_attempts() {
        let err = FetchError {
            url: "https://example.test/x".into(),
            attempts: 3,
            last_error: "timed out".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.test/x"));
        assert!(msg.contains("3 attempt"));
        assert!(msg.contains("timed out"));
    }
}
