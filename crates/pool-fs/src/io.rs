//! Bounded text reads

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Largest document we are willing to read (1 MiB).
pub const MAX_DOCUMENT_SIZE: u64 = 1024 * 1024;

/// Read text content from a file, refusing anything over [`MAX_DOCUMENT_SIZE`].
pub fn read_text(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(Error::DocumentTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_text_returns_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pool.yml");
        fs::write(&path, "name: test\n").unwrap();

        assert_eq!(read_text(&path).unwrap(), "name: test\n");
    }

    #[test]
    fn read_text_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_text(&dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn read_text_rejects_oversized_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.yml");
        fs::write(&path, vec![b'#'; (MAX_DOCUMENT_SIZE + 1) as usize]).unwrap();

        let err = read_text(&path).unwrap_err();
        assert!(matches!(err, Error::DocumentTooLarge { .. }));
    }
}
