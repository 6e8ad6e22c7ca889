//! Downloading installer scripts and packages.
//!
//! - [`Transfer`] - one download attempt
//! - [`HttpTransfer`] - the HTTP implementation
//! - [`Fetcher`] - bounded, fixed-backoff retry around a transfer

pub mod http;
pub mod retry;

pub use http::HttpTransfer;
pub use retry::{verify_sha256, FetchError, Fetcher, RetryPolicy};

use std::path::Path;

/// A single attempt to copy the resource at `url` to `dest`.
///
/// Implementations should not leave a partially written `dest` behind on
/// failure; [`Fetcher`] removes one anyway before retrying.
pub trait Transfer {
    fn transfer(&self, url: &str, dest: &Path) -> anyhow::Result<()>;
}
