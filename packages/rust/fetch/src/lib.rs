//! Archive fetching for Geoflow.
//!
//! Maps a GEO series accession to its supplementary-archive URL and
//! streams the archive to disk. The download is written to a `.part`
//! sibling and committed with a rename so a half-written archive never
//! satisfies the orchestrator's existence check.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use url::Url;

use geoflow_shared::{GeoflowError, Result, part_path};

pub use reqwest::Client;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("Geoflow/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client suitable for archive downloads.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| GeoflowError::Fetch(format!("failed to build HTTP client: {e}")))
}

/// Derive the supplementary-archive URL for a GEO series accession.
///
/// GEO shards series directories by accession prefix: the last three
/// characters are replaced with `nnn`, so `GSE12345` lives under
/// `geo/series/GSE12nnn/GSE12345/suppl/GSE12345_RAW.tar`.
pub fn archive_url(mirror_base: &Url, dataset: &str) -> Result<Url> {
    if !dataset.is_ascii() || dataset.len() <= 3 {
        return Err(GeoflowError::config(format!(
            "invalid dataset accession '{dataset}'"
        )));
    }

    let prefix = &dataset[..dataset.len() - 3];
    let path = format!("geo/series/{prefix}nnn/{dataset}/suppl/{dataset}_RAW.tar");

    mirror_base
        .join(&path)
        .map_err(|e| GeoflowError::config(format!("bad mirror URL: {e}")))
}

/// Stream `url` to `dest`, creating parent directories as needed.
///
/// The payload is written chunk by chunk (never held whole in memory).
/// On success `dest` exists in final form; on failure it is absent.
#[instrument(skip_all, fields(url = %url, dest = %dest.display()))]
pub async fn fetch_archive(client: &Client, url: &Url, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GeoflowError::io(parent, e))?;
    }

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| GeoflowError::Fetch(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GeoflowError::Fetch(format!("{url}: HTTP {status}")));
    }

    let tmp = part_path(dest);
    let mut file = tokio::fs::File::create(&tmp)
        .await
        .map_err(|e| GeoflowError::io(&tmp, e))?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| GeoflowError::Fetch(format!("{url}: body read failed: {e}")))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| GeoflowError::io(&tmp, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| GeoflowError::io(&tmp, e))?;
    drop(file);

    debug!(bytes = written, "download complete, committing");
    tokio::fs::rename(&tmp, dest)
        .await
        .map_err(|e| GeoflowError::io(dest, e))?;

    info!(bytes = written, "archive fetched");
    Ok(())
}
