use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ActivityError, Result};

/// Write a file so that `path` either holds the complete new content or is
/// left untouched.
///
/// `write` receives a buffered writer over a temporary file created next to
/// `path`. Once it returns `Ok`, the data is flushed and synced, then the
/// temporary file is renamed over `path`. On any error the temporary file is
/// removed and nothing appears at `path`.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let output_err = |source: std::io::Error| ActivityError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = parent_dir(path);
    let mut tmp = tempfile::Builder::new()
        .prefix(".chat-activity-")
        .suffix(".partial")
        .tempfile_in(&dir)
        .map_err(output_err)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush().map_err(output_err)?;
    }
    tmp.as_file().sync_all().map_err(output_err)?;

    tmp.persist(path).map_err(|e| output_err(e.error))?;
    debug!("Finalized {}", path.display());
    Ok(())
}

/// Directory that will contain `path`; the current directory for bare file
/// names.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
