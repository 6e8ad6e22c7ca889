//! HTTP downloads.
//!
//! Provides a single-attempt HTTP transfer for installer scripts and
//! packages. Retrying is layered on top by [`Fetcher`](super::Fetcher).

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::Transfer;

/// Downloads over HTTP/HTTPS.
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    /// Create a new HTTP transfer with default 30-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP transfer with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rigup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Transfer for HttpTransfer {
    /// Stream `url` into `<dest>.part`, renaming over `dest` only once the
    /// body has been written completely.
    fn transfer(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self.client.get(url).send()?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let part = partial_path(dest);
        let written = File::create(&part)
            .map_err(anyhow::Error::from)
            .and_then(|mut file| {
                response.copy_to(&mut file)?;
                file.sync_all()?;
                Ok(())
            });

        if let Err(e) = written {
            let _ = fs::remove_file(&part);
            return Err(e.context(format!("writing {}", dest.display())));
        }

        fs::rename(&part, dest)?;
        Ok(())
    }
}

/// Sibling path a download is staged at before it is complete.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
