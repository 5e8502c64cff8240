use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Fixed artifact name. The document is always saved under this name.
pub const PRD_FILENAME: &str = "PRD.md";

/// Write `text` byte-for-byte to `dir/PRD.md`, creating `dir` if needed.
pub fn write_prd(dir: &Path, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(PRD_FILENAME);
    fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_fixed_filename() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_prd(dir.path(), "# Product Overview\n").expect("write");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("PRD.md"));
    }

    #[test]
    fn test_content_is_byte_for_byte() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = "# Product Overview\n\nÜñíçödé, no trailing newline added";
        let path = write_prd(dir.path(), text).expect("write");
        let bytes = fs::read(path).expect("read");
        assert_eq!(bytes, text.as_bytes());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("out").join("docs");
        let path = write_prd(&nested, "content").expect("write");
        assert!(path.exists());
        assert!(path.starts_with(&nested));
    }
}
