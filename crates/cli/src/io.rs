//! File I/O with path context on every failure.

use std::{
    fs::{create_dir_all, read, rename, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// An output or input file handle.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
    }

    /// Writes to a `.partial` sibling, then renames it over the target.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        let staging = self.staging_path();
        write(&staging, data)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        rename(&staging, &self.path)
            .with_context(|| format!("Failed to move {} into place", self.path.display()))
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

impl AsRef<Path> for OutputFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn read_font(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    read(path).with_context(|| format!("Failed to read font: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parent_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = OutputFile::new(dir.path().join("out/icons.ttf"));
        file.write(b"data").unwrap();

        assert_eq!(file.read().unwrap(), b"data");
        assert!(!dir.path().join("out/icons.ttf.partial").exists());
    }

    #[test]
    fn test_read_missing_font_names_path() {
        let err = read_font("/nonexistent/icons.ttf").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/icons.ttf"));
    }
}
