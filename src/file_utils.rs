use anyhow::{Result, Context};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extension of GPX documents picked up from directories
pub const GPX_EXTENSION: &str = "gpx";

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

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Resolve wildcard patterns, directories and plain paths into a list of files.
    ///
    /// Patterns are expanded in the order given; glob matches keep the order
    /// the glob crate yields them in (sorted per directory). A pattern with no
    /// match is tried as a direct path. Directories contribute the GPX files
    /// found beneath them. Nothing is deduplicated.
    pub fn resolve_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let matches = Self::expand_pattern(pattern);

            if matches.is_empty() {
                let direct = Path::new(pattern);
                if Self::file_exists(direct) {
                    files.push(direct.to_path_buf());
                } else if Self::dir_exists(direct) {
                    files.extend(Self::find_files(direct, GPX_EXTENSION)?);
                } else {
                    debug!("Pattern matched nothing: {}", pattern);
                }
                continue;
            }

            for path in matches {
                if path.is_file() {
                    files.push(path);
                } else if path.is_dir() {
                    files.extend(Self::find_files(&path, GPX_EXTENSION)?);
                }
            }
        }

        Ok(files)
    }

    // @expands: Glob pattern, empty on invalid pattern or no match
    fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
        match glob::glob(pattern) {
            Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
            Err(e) => {
                debug!("Not a valid glob pattern '{}': {}", pattern, e);
                Vec::new()
            }
        }
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories as needed
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
