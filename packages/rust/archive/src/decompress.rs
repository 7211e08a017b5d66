//! Gzip member decompression.
//!
//! Walks an extracted archive tree and gunzips every `.gz` member into a
//! flat output directory, stripping the `.gz` suffix. Members are
//! independent, so they are decompressed concurrently under a semaphore;
//! a corrupt member is logged and skipped without aborting its siblings.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use geoflow_shared::{GeoflowError, Result, commit_dir, part_path};

/// Decompress every `.gz` member under `scan_dir` into `out_dir`.
///
/// Originals are left untouched. The output directory is built under a
/// `.part` name and committed by rename once every member has been
/// processed. Returns the number of members successfully decompressed.
#[instrument(skip_all, fields(scan = %scan_dir.display(), out = %out_dir.display()))]
pub async fn decompress_members(
    scan_dir: &Path,
    out_dir: &Path,
    concurrency: usize,
) -> Result<usize> {
    let tmp = part_path(out_dir);
    if tmp.exists() {
        std::fs::remove_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;
    }
    std::fs::create_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;

    // Dedupe by output name up front so concurrent workers never race on
    // the same destination; later members in walk order win.
    let members = collect_members(scan_dir, out_dir);
    debug!(members = members.len(), "gzip members found");

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(members.len());

    for (name, input) in members {
        let sem = semaphore.clone();
        let dest = tmp.join(&name);
        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            tokio::task::spawn_blocking(move || gunzip_file(&input, &dest))
                .await
                .expect("decompress task panicked")
        }));
    }

    let mut decompressed = 0usize;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => decompressed += 1,
            Ok(Err(e)) => warn!(error = %e, "skipping corrupt member"),
            Err(e) => warn!(error = %e, "decompress task failed"),
        }
    }

    commit_dir(&tmp, out_dir)?;
    info!(decompressed, "members decompressed");
    Ok(decompressed)
}

/// Collect `.gz` members under `scan_dir`, keyed by output file name.
fn collect_members(scan_dir: &Path, out_dir: &Path) -> BTreeMap<String, PathBuf> {
    let skip = part_path(out_dir);
    let mut members = BTreeMap::new();

    for entry in WalkDir::new(scan_dir)
        .into_iter()
        .filter_entry(|e| e.path() != out_dir && e.path() != skip)
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(stripped) = name.strip_suffix(".gz") {
            members.insert(stripped.to_string(), entry.into_path());
        }
    }

    members
}

/// Gunzip a single member. Scoped failure: a corrupt stream is a
/// `Decompress` error for this member only.
fn gunzip_file(input: &Path, dest: &Path) -> Result<()> {
    let file = File::open(input).map_err(|e| GeoflowError::io(input, e))?;
    let mut decoder = GzDecoder::new(file);
    let mut out = File::create(dest).map_err(|e| GeoflowError::io(dest, e))?;

    if let Err(e) = std::io::copy(&mut decoder, &mut out) {
        drop(out);
        let _ = std::fs::remove_file(dest);
        return Err(GeoflowError::Decompress(format!(
            "{}: {e}",
            input.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gz_bytes(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn decompresses_nested_members_and_strips_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("GSE1");
        std::fs::create_dir_all(scan.join("sub")).unwrap();
        std::fs::write(scan.join("a.txt.gz"), gz_bytes(b"alpha")).unwrap();
        std::fs::write(scan.join("sub/b.txt.gz"), gz_bytes(b"beta")).unwrap();
        std::fs::write(scan.join("notes.txt"), b"plain, left alone").unwrap();

        let out = scan.join("decompressed");
        let n = decompress_members(&scan, &out, 4).await.unwrap();

        assert_eq!(n, 2);
        assert_eq!(std::fs::read(out.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(std::fs::read(out.join("b.txt")).unwrap(), b"beta");
        // Originals untouched
        assert!(scan.join("a.txt.gz").exists());
        assert!(scan.join("sub/b.txt.gz").exists());
        // Non-gz files are not copied
        assert!(!out.join("notes.txt").exists());
    }

    #[tokio::test]
    async fn corrupt_member_does_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("GSE2");
        std::fs::create_dir_all(&scan).unwrap();
        std::fs::write(scan.join("good.txt.gz"), gz_bytes(b"fine")).unwrap();
        std::fs::write(scan.join("bad.txt.gz"), b"not gzip data at all").unwrap();

        let out = scan.join("decompressed");
        let n = decompress_members(&scan, &out, 2).await.unwrap();

        assert_eq!(n, 1);
        assert_eq!(std::fs::read(out.join("good.txt")).unwrap(), b"fine");
        assert!(!out.join("bad.txt").exists());
    }

    #[tokio::test]
    async fn empty_tree_yields_empty_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("GSE3");
        std::fs::create_dir_all(&scan).unwrap();

        let out = scan.join("decompressed");
        let n = decompress_members(&scan, &out, 2).await.unwrap();

        assert_eq!(n, 0);
        assert!(out.is_dir());
    }
}
