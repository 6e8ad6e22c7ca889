//! Resources that live for exactly one invocation.
//!
//! - [`RunLog`] - the append-only, timestamped log file
//! - [`ScratchDir`] - temporary storage for downloads, removed on drop

mod log;
mod scratch;

pub use log::{default_log_dir, LogLevel, RunLog};
pub use scratch::ScratchDir;

use std::path::Path;

use crate::error::Result;

/// The log and scratch directory of one run.
#[derive(Debug)]
pub struct Session {
    pub log: RunLog,
    pub scratch: ScratchDir,
}

impl Session {
    /// Open a new run log in `log_dir` and create the scratch directory.
    pub fn start(log_dir: &Path) -> Result<Self> {
        let log = RunLog::create(log_dir)?;
        let scratch = ScratchDir::create()?;
        Ok(Self { log, scratch })
    }

    /// Release the scratch directory.
    pub fn finish(self) -> Result<()> {
        self.scratch.close()
    }
}
