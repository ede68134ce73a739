use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use recolor_contracts::ColorizeError;

pub const FALLBACK_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

pub fn load_source(path: &Path) -> Result<SourceImage, ColorizeError> {
    if !path.exists() {
        return Err(ColorizeError::input(path, "file does not exist"));
    }
    if !path.is_file() {
        return Err(ColorizeError::input(path, "not a regular file"));
    }
    let bytes = fs::read(path).map_err(|err| {
        let reason = match err.kind() {
            IoErrorKind::NotFound => "file does not exist".to_string(),
            IoErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => format!("read failed: {err}"),
        };
        ColorizeError::input(path, reason)
    })?;
    Ok(SourceImage {
        path: path.to_path_buf(),
        bytes,
        mime_type: mime_for_path(path),
    })
}

/// Leading-dot names like `.png` have no extension and map to `image/jpeg`.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => FALLBACK_MIME,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use recolor_contracts::ErrorKind;

    use super::{load_source, mime_for_path};

    #[test]
    fn known_extensions_map_exactly_in_any_case() {
        for (name, expected) in [
            ("a.png", "image/png"),
            ("a.PNG", "image/png"),
            ("a.webp", "image/webp"),
            ("a.WebP", "image/webp"),
            ("a.gif", "image/gif"),
            ("dir.v2/a.Gif", "image/gif"),
        ] {
            assert_eq!(mime_for_path(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn other_or_missing_extensions_fall_back_to_jpeg() {
        for name in ["a.jpg", "a.jpeg", "a.bmp", "a.tiff", "a", ".png", "a.png.bak"] {
            assert_eq!(mime_for_path(Path::new(name)), "image/jpeg", "{name}");
        }
    }

    #[test]
    fn loads_bytes_and_mime() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("photo.webp");
        fs::write(&path, b"webp-bytes")?;

        let source = load_source(&path)?;
        assert_eq!(source.bytes, b"webp-bytes");
        assert_eq!(source.mime_type, "image/webp");
        assert_eq!(source.path, path);
        Ok(())
    }

    #[test]
    fn missing_file_is_input_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let err = load_source(&temp.path().join("nope.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.to_string().contains("nope.png"));
        Ok(())
    }

    #[test]
    fn directory_is_input_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let err = load_source(temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        Ok(())
    }
}
