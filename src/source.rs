//! Raw text loading boundary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies a document's raw UTF-8 text by name.
pub trait TextSource {
    /// Load the full text for `name`.
    ///
    /// # Errors
    /// Returns an error if the text cannot be read or is not valid UTF-8.
    fn load_raw_text(&self, name: &str) -> io::Result<String>;
}

/// Reads documents from the filesystem, relative to a base directory.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    base_dir: PathBuf,
}

impl FsSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl TextSource for FsSource {
    fn load_raw_text(&self, name: &str) -> io::Result<String> {
        let path = Path::new(name);
        if path.is_absolute() {
            fs::read_to_string(path)
        } else {
            fs::read_to_string(self.base_dir.join(path))
        }
    }
}
