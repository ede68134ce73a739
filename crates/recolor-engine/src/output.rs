#[cfg(unix)]
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use recolor_contracts::ColorizeError;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

pub const OUTPUT_PREFIX: &str = "colored_";
/// Mode of a freshly created output; an existing output keeps its own.
pub const DEFAULT_OUTPUT_MODE: u32 = 0o644;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputImage {
    pub path: PathBuf,
    pub bytes_written: u64,
    pub sha256: String,
    /// Sniffed from the written bytes; `None` when unrecognized.
    pub format: Option<&'static str>,
}

/// `<dir>/colored_<name>` for a source at `<dir>/<name>`.
pub fn output_path_for(source_path: &Path) -> PathBuf {
    let name = source_path
        .file_name()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_default();
    output_dir_for(source_path).join(format!("{OUTPUT_PREFIX}{name}"))
}

fn output_dir_for(source_path: &Path) -> PathBuf {
    match source_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Writes beside the source through a temp file that is renamed into
/// place, so the destination is either the old file or the complete new one.
pub fn write_output(bytes: &[u8], source_path: &Path) -> Result<OutputImage, ColorizeError> {
    let path = output_path_for(source_path);
    let io_err = |source: io::Error| ColorizeError::Io {
        path: path.clone(),
        source,
    };

    let mut staged = NamedTempFile::new_in(output_dir_for(source_path)).map_err(io_err)?;
    staged.write_all(bytes).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;
    #[cfg(unix)]
    staged
        .as_file()
        .set_permissions(output_permissions(&path))
        .map_err(io_err)?;
    staged.persist(&path).map_err(|err| io_err(err.error))?;

    Ok(OutputImage {
        bytes_written: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(bytes)),
        format: sniff_format(bytes),
        path,
    })
}

// Temp files are created owner-only; the renamed output must not be.
#[cfg(unix)]
fn output_permissions(path: &Path) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(DEFAULT_OUTPUT_MODE))
}

fn sniff_format(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
}
