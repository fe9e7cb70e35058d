use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use chapter_core::{render_chapter, render_failure, scan_titles};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the archive's directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ArchiveError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| ArchiveError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(ArchiveError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| ArchiveError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| ArchiveError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Append-only chapter archive.
///
/// Each record is rendered in full and written with a single call, then
/// flushed and synced, so a kill between chapters never leaves a torn
/// record behind.
pub struct ChapterArchive {
    file: File,
    path: PathBuf,
}

impl ChapterArchive {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            ensure_output_dir(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_chapter(&mut self, title: &str, body: &str) -> Result<(), ArchiveError> {
        self.append_record(&render_chapter(title, body))
    }

    /// Writes the failure placeholder for `title`. Placeholders are not
    /// marker-framed, so a later resume scan retries the chapter.
    pub fn append_failure(&mut self, title: &str) -> Result<(), ArchiveError> {
        self.append_record(&render_failure(title))
    }

    fn append_record(&mut self, record: &str) -> Result<(), ArchiveError> {
        self.file.write_all(record.as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// Titles already completed in the archive at `path`.
///
/// Best effort by contract: a missing file is the normal first-run case; a
/// file we cannot read is logged and treated as empty rather than blocking
/// the resume run.
pub fn load_completed_titles(path: &Path) -> BTreeSet<String> {
    match fs::read_to_string(path) {
        Ok(content) => scan_titles(&content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no existing archive at {}; starting fresh", path.display());
            BTreeSet::new()
        }
        Err(err) => {
            log::warn!(
                "existing archive at {} could not be read ({err}); resuming without it",
                path.display()
            );
            BTreeSet::new()
        }
    }
}
