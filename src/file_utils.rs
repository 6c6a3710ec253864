use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @checks: File exists with at least one byte of content
    pub fn is_non_empty_file<P: AsRef<Path>>(path: P) -> bool {
        fs::metadata(path.as_ref())
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        // Ensure the target directory exists
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        // Perform the copy
        fs::copy(from, to)?;

        Ok(())
    }

    /// Recursively copy a directory tree, preserving relative structure
    pub fn copy_dir_recursive<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.is_dir() {
            return Err(anyhow::anyhow!(
                "Source directory does not exist: {:?}",
                from
            ));
        }

        for entry in WalkDir::new(from) {
            let entry = entry.context("Failed to read directory entry")?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .context("Walked entry outside the source directory")?;
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                Self::ensure_dir(&target)?;
            } else {
                Self::copy_file(entry.path(), &target)?;
            }
        }

        Ok(())
    }
}
