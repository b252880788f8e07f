//! Checks on files produced by external tools

use std::path::Path;

/// Output verifier
pub struct OutputVerifier;

impl OutputVerifier {
    /// Size of `path`, or a message when it is missing or empty
    pub fn ensure_non_empty(path: &Path) -> Result<u64, String> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
            Ok(meta) if meta.is_file() => Err(format!("output file is empty: {}", path.display())),
            Ok(_) => Err(format!("output is not a file: {}", path.display())),
            Err(e) => Err(format!("output file missing: {} ({})", path.display(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_non_empty() {
        let dir = TempDir::new().unwrap();
        let full = dir.path().join("full.mp4");
        let empty = dir.path().join("empty.mp4");
        std::fs::write(&full, b"data").unwrap();
        std::fs::write(&empty, b"").unwrap();

        assert_eq!(OutputVerifier::ensure_non_empty(&full), Ok(4));
        assert!(OutputVerifier::ensure_non_empty(&empty).is_err());
        assert!(OutputVerifier::ensure_non_empty(&dir.path().join("missing.mp4")).is_err());
        assert!(OutputVerifier::ensure_non_empty(dir.path()).is_err());
    }
}
