use speechcheck_common::{Result, SpeechCheckError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const TEMP_PREFIX: &str = "speechcheck-";

/// Suffix lets recognizers infer the container format
const TEMP_SUFFIX: &str = ".wav";

/// Uploaded audio staged on disk for the lifetime of one request
///
/// The file is deleted when the guard is dropped, whichever way the handler
/// exits.
pub struct ScopedAudioFile {
    file: Option<NamedTempFile>,
    path: PathBuf,
    len: u64,
}

impl ScopedAudioFile {
    /// Create a uniquely named `.wav` file in `dir`
    pub fn create_in(dir: &Path) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| {
                SpeechCheckError::file_system(format!(
                    "Failed to create temporary file in {}: {}",
                    dir.display(),
                    e
                ))
            })?;

        let path = file.path().to_path_buf();
        debug!("Created temporary audio file: {}", path.display());

        Ok(Self {
            file: Some(file),
            path,
            len: 0,
        })
    }

    /// Append upload bytes
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(data)?;
            self.len += data.len() as u64;
        }
        Ok(())
    }

    /// Flush buffered bytes so other readers see the whole upload
    pub fn finish(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    /// Path handed to the recognizer
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for ScopedAudioFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => debug!("Removed temporary audio file: {}", self.path.display()),
                Err(e) => warn!(
                    "Failed to remove temporary audio file {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_named_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut audio = ScopedAudioFile::create_in(dir.path()).unwrap();
        audio.write_chunk(b"RIFF").unwrap();
        audio.write_chunk(b"WAVE").unwrap();
        audio.finish().unwrap();

        let name = audio.path().file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("speechcheck-"));
        assert!(name.ends_with(".wav"));
        assert_eq!(audio.len(), 8);
        assert_eq!(std::fs::read(audio.path()).unwrap(), b"RIFFWAVE");
    }

    #[test]
    fn test_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let audio = ScopedAudioFile::create_in(dir.path()).unwrap();
            assert!(audio.path().exists());
            assert!(audio.is_empty());
            audio.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScopedAudioFile::create_in(dir.path()).unwrap();
        let b = ScopedAudioFile::create_in(dir.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            ScopedAudioFile::create_in(&missing),
            Err(SpeechCheckError::FileSystem(_))
        ));
    }
}
