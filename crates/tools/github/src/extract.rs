//! Zip extraction for downloaded release archives.

use setup_slv_core::{Error, Result, TOOL_NAME};
use std::fs::File;
use std::path::Path;

/// Extract the zip archive at `archive` into `dest`.
///
/// Uses a temporary sibling directory for atomic extraction - if extraction
/// fails partway through, no partial files are left in the destination.
/// Entries with paths escaping the archive root are skipped.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| Error::extract(archive, format!("Failed to open zip: {e}")))?;

    let temp_dir = dest.with_file_name(format!(
        ".{}.tmp",
        dest.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("extract")
    ));

    // Clean up any previous failed extraction
    if temp_dir.exists() {
        std::fs::remove_dir_all(&temp_dir)?;
    }
    std::fs::create_dir_all(&temp_dir)?;

    let extract_result = (|| -> Result<()> {
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| Error::extract(archive, format!("Failed to read zip entry: {e}")))?;

            let Some(relative) = entry.enclosed_name() else {
                continue;
            };
            let outpath = temp_dir.join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)?;
                continue;
            }
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut out)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let is_tool = outpath.file_name().and_then(|s| s.to_str()) == Some(TOOL_NAME);
                let mode = entry.unix_mode().or(is_tool.then_some(0o755));
                if let Some(mode) = mode {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
                }
            }
        }
        Ok(())
    })();

    // On failure, clean up temp directory
    if let Err(e) = extract_result {
        let _ = std::fs::remove_dir_all(&temp_dir);
        return Err(e);
    }

    // Atomic move: remove destination if exists, then rename temp to dest
    if dest.exists() {
        std::fs::remove_dir_all(dest)?;
    }
    std::fs::rename(&temp_dir, dest)?;
    Ok(())
}
