//! Directory tree to entry list mapping.
//!
//! [`TreeBuilder`] walks host paths recursively and produces the ordered
//! list of files a new archive will hold. Files keep host directory
//! iteration order, which is not sorted. Any error anywhere aborts the
//! whole walk and no partial list is returned.

use pbo_core::entry::Entry;
use pbo_core::error::{PboError, Result};
use pbo_core::path;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// A file scheduled for archiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Where the body is read from.
    pub source: PathBuf,
    /// The header entry describing it.
    pub entry: Entry,
}

/// Recursive walker producing [`SourceFile`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    capture_timestamps: bool,
}

impl TreeBuilder {
    /// Create a builder that does not capture timestamps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record file modification times in the entries.
    pub fn capture_timestamps(mut self, enable: bool) -> Self {
        self.capture_timestamps = enable;
        self
    }

    /// Walk every root, in order, and collect the files found.
    pub fn build<P: AsRef<Path>>(&self, roots: &[P]) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        for root in roots {
            let root = path::strip_trailing_separator(root.as_ref());
            self.visit(&root, &mut files)?;
        }
        Ok(files)
    }

    fn visit(&self, path: &Path, files: &mut Vec<SourceFile>) -> Result<()> {
        let metadata = fs::metadata(path)?;

        if metadata.is_file() {
            files.push(self.file_entry(path, &metadata)?);
        } else if metadata.is_dir() {
            for child in fs::read_dir(path)? {
                let child = child?;
                self.visit(&path.join(child.file_name()), files)?;
            }
        } else {
            return Err(PboError::invalid_argument(format!(
                "{} is neither a regular file nor a directory",
                path.display()
            )));
        }

        Ok(())
    }

    fn file_entry(&self, path: &Path, metadata: &Metadata) -> Result<SourceFile> {
        let size = entry_size(metadata.len(), path)?;
        let timestamp = if self.capture_timestamps {
            modification_time(metadata, path)?
        } else {
            0
        };

        let entry =
            Entry::regular(path::host_to_archive_path(path)?, size).with_timestamp(timestamp);
        tracing::debug!(path = %path.display(), size, timestamp, "found file");

        Ok(SourceFile {
            source: path.to_path_buf(),
            entry,
        })
    }
}

/// Narrow a file length to the 32-bit size field.
pub fn entry_size(len: u64, path: &Path) -> Result<u32> {
    u32::try_from(len).map_err(|_| PboError::overflow(format!("size of {}", path.display()), len))
}

/// Modification time in whole seconds; times before the epoch read as 0.
fn modification_time(metadata: &Metadata, path: &Path) -> Result<u32> {
    let secs = match metadata.modified()?.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs(),
        Err(_) => 0,
    };
    u32::try_from(secs)
        .map_err(|_| PboError::overflow(format!("modification time of {}", path.display()), secs))
}
