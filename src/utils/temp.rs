use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file in the system temp directory that is removed when dropped.
///
/// Removal happens on every exit path of the owner, including early returns
/// and errors.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Reserve a unique path such as `/tmp/chartsage_chart_<uuid>.png`.
    /// Nothing is written until the caller (or a drawing backend) creates it.
    pub fn reserve(prefix: &str, extension: &str) -> Self {
        let filename = format!("chartsage_{}_{}.{}", prefix, uuid::Uuid::new_v4(), extension);
        Self {
            path: std::env::temp_dir().join(filename),
        }
    }

    /// Reserve a path and write `bytes` to it
    pub fn with_bytes(prefix: &str, extension: &str, bytes: &[u8]) -> io::Result<Self> {
        let artifact = Self::reserve(prefix, extension);
        fs::write(&artifact.path, bytes)?;
        tracing::debug!("Temporary artifact written: {} ({} bytes)", artifact.path.display(), bytes.len());
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.exists() {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(_) => tracing::debug!("✓ Temporary artifact deleted: {}", self.path.display()),
            Err(e) => tracing::warn!("Failed to delete temporary artifact {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_removed_on_drop() {
        let artifact = TempArtifact::with_bytes("test", "bin", b"abc").expect("write failed");
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(artifact.read().unwrap(), b"abc");

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_reserved_paths_are_unique() {
        let a = TempArtifact::reserve("chart", "png");
        let b = TempArtifact::reserve("chart", "png");
        assert_ne!(a.path(), b.path());
        assert!(!a.exists());
    }

    #[test]
    fn test_removed_when_owner_returns_early() {
        fn fails_after_writing(path_out: &mut Option<PathBuf>) -> Result<(), String> {
            let artifact = TempArtifact::with_bytes("early", "png", b"data").map_err(|e| e.to_string())?;
            *path_out = Some(artifact.path().to_path_buf());
            Err("boom".to_string())
        }

        let mut path = None;
        assert!(fails_after_writing(&mut path).is_err());
        assert!(!path.expect("path recorded").exists());
    }
}
