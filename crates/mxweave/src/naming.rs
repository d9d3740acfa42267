//! Output file naming and atomic writes.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::info;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::{config::OutputConfig, error::MxweaveError};

/// Names output files, optionally with a content hash suffix.
///
/// # Examples
///
/// ```
/// use mxweave::naming::OutputNamer;
///
/// let namer = OutputNamer::default();
/// let name = namer.file_name("diagram.drawio", true, "<mxfile/>");
/// assert!(name.starts_with("diagram_"));
/// assert!(name.ends_with(".drawio"));
/// assert_eq!(namer.file_name("diagram", false, "<mxfile/>"), "diagram.drawio");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNamer {
    extension: String,
    hash_len: usize,
}

impl Default for OutputNamer {
    fn default() -> Self {
        Self {
            extension: "drawio".to_string(),
            hash_len: 8,
        }
    }
}

impl OutputNamer {
    pub fn new(extension: impl Into<String>, hash_len: usize) -> Self {
        let extension: String = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            hash_len,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.extension(), config.hash_length())
    }

    /// First `hash_len` hex digits of the SHA-256 of `content`.
    pub fn content_hash(&self, content: &str) -> String {
        let digest = Sha256::digest(content.as_bytes());
        digest
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>()
            .chars()
            .take(self.hash_len)
            .collect()
    }

    /// File name for `content`: `base` without a trailing extension, an
    /// optional `_<hash>` suffix, then the extension.
    pub fn file_name(&self, base: &str, hash: bool, content: &str) -> String {
        let suffix = format!(".{}", self.extension);
        let stem = base.strip_suffix(suffix.as_str()).unwrap_or(base);
        if hash && self.hash_len > 0 {
            format!("{stem}_{}{suffix}", self.content_hash(content))
        } else {
            format!("{stem}{suffix}")
        }
    }

    /// Writes `content` to `dir/file_name` through a temporary file in `dir`.
    ///
    /// An existing file at that path is replaced.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError::Io` if the temporary file cannot be written or
    /// moved into place.
    pub fn write(&self, dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, MxweaveError> {
        let path = dir.join(file_name);
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.persist(&path).map_err(|err| err.error)?;

        info!(path = path.display().to_string(), bytes = content.len(); "Diagram written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let namer = OutputNamer::default();
        let first = namer.file_name("diagram", true, "<mxfile>a</mxfile>");
        let again = namer.file_name("diagram", true, "<mxfile>a</mxfile>");
        let changed = namer.file_name("diagram", true, "<mxfile>b</mxfile>");

        assert_eq!(first, again);
        assert_ne!(first, changed);
        assert_eq!(first.len(), "diagram_".len() + 8 + ".drawio".len());
    }

    #[test]
    fn test_known_digest_prefix() {
        let namer = OutputNamer::new("drawio", 8);
        assert_eq!(namer.content_hash(""), "e3b0c442");
    }

    #[test]
    fn test_extension_handling() {
        let namer = OutputNamer::new(".xml", 4);
        assert_eq!(namer.file_name("out.xml", false, ""), "out.xml");
        assert_eq!(namer.file_name("out.drawio", false, ""), "out.drawio.xml");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let namer = OutputNamer::default();

        let first = namer.write(dir.path(), "diagram.drawio", "one").unwrap();
        let second = namer.write(dir.path(), "diagram.drawio", "two").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "two");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = OutputNamer::default()
            .write(&dir.path().join("absent"), "d.drawio", "x")
            .unwrap_err();
        assert!(matches!(err, MxweaveError::Io(_)));
    }
}
