//! Process-scoped scratch directory for downloaded artifacts.

use std::path::Path;

use tempfile::TempDir;

use crate::error::Result;

/// A temporary directory removed when dropped.
///
/// Created once at start-up. Installer scripts and packages are downloaded
/// here, so nothing fetched during a run outlives it, whether the run
/// completes, aborts in pre-flight, or is interrupted.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory in the system temp location.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("rigup-").tempdir()?;
        tracing::debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, reporting any failure.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn removed_on_drop_with_downloads_inside() {
        let path = {
            let scratch = ScratchDir::create().unwrap();
            fs::write(scratch.path().join("installer.sh"), "echo hi").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn removed_on_close() {
        let scratch = ScratchDir::create().unwrap();
        let path = scratch.path().to_path_buf();
        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn named_for_the_tool() {
        let scratch = ScratchDir::create().unwrap();
        let name = scratch.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("rigup-"));
    }
}
