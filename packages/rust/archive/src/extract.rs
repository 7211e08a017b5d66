//! Tar container extraction.

use std::fs::File;
use std::path::Path;

use tracing::{info, instrument};

use geoflow_shared::{GeoflowError, Result, commit_dir, part_path};

/// Unpack `tar_path` into `out_dir`.
///
/// The archive is fully extracted into a `.part` sibling and committed
/// with a single rename, so `out_dir` is either absent or complete. A
/// corrupt container leaves `out_dir` absent.
#[instrument(skip_all, fields(tar = %tar_path.display(), out = %out_dir.display()))]
pub fn extract_tar(tar_path: &Path, out_dir: &Path) -> Result<()> {
    let tmp = part_path(out_dir);
    if tmp.exists() {
        std::fs::remove_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;
    }
    std::fs::create_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;

    let file = File::open(tar_path).map_err(|e| GeoflowError::io(tar_path, e))?;
    let mut archive = tar::Archive::new(file);

    if let Err(e) = archive.unpack(&tmp) {
        let _ = std::fs::remove_dir_all(&tmp);
        return Err(GeoflowError::Extract(format!(
            "{}: {e}",
            tar_path.display()
        )));
    }

    commit_dir(&tmp, out_dir)?;
    info!("archive extracted");
    Ok(())
}
