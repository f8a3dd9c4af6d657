//! Throwaway session key files.

use std::io;
use std::path::PathBuf;

use uuid::Uuid;

/// Key file in the temp dir, deleted when dropped.
#[derive(Debug)]
pub struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    /// Write `len` bytes of key material.
    pub fn new(len: usize) -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!("campgrounds-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len])?;
        Ok(Self { path })
    }

    /// Path in the form `SESSION_KEY_FILE` expects.
    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            tracing::debug!(%error, "temporary session key already gone");
        }
    }
}
