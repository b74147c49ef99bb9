//! FAST archive retrieval.
//!
//! For each facet of a [`FacetTable`], streams `<base>/<ArchiveName>.marcxml.zip`
//! to `<target>/<ArchiveName>.marcxml.zip` and extracts it in place, producing
//! `<target>/<ArchiveName>.marcxml`. Facets are fetched one after another; the
//! first failure aborts the run.

mod extract;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use sha2::{Digest, Sha256};
use subjects_fast_shared::{Facet, FacetTable, Result, SubjectsFastError};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Maximum number of redirects to follow per archive.
const MAX_REDIRECTS: usize = 5;

/// Default per-request timeout. The larger FAST archives are tens of MB.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// User-Agent string for archive requests.
const USER_AGENT: &str = concat!("subjects-fast/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Configuration for the download process.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Timeout for each HTTP request in seconds.
    pub timeout_secs: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// One retrieved and extracted facet archive.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub facet: Facet,
    /// Remote URL the archive was fetched from.
    pub url: String,
    /// `<target>/<ArchiveName>.marcxml.zip`
    pub zip_path: PathBuf,
    /// `<target>/<ArchiveName>.marcxml`
    pub marcxml_path: PathBuf,
    /// Size of the archive in bytes.
    pub bytes: u64,
    /// Hex SHA-256 of the archive.
    pub sha256: String,
}

// ---------------------------------------------------------------------------
// Downloader
// ---------------------------------------------------------------------------

/// Sequential archive downloader sharing one HTTP client.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(opts: &DownloadOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| SubjectsFastError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch and extract a single facet's archive into `target_dir`
    /// (which must exist).
    #[instrument(skip_all, fields(facet = %facet))]
    pub async fn download_facet(
        &self,
        table: &FacetTable,
        facet: Facet,
        target_dir: &Path,
    ) -> Result<DownloadedArchive> {
        let url = table.archive_url(facet);
        let zip_path = target_dir.join(facet.zip_file_name());
        let marcxml_path = target_dir.join(facet.marcxml_file_name());

        info!(%url, "fetching archive");
        let (bytes, sha256) = self.fetch_to_file(&url, &zip_path).await?;

        let extracted = extract::extract_archive(&zip_path, target_dir)?;
        if !extracted.contains(&marcxml_path) {
            return Err(SubjectsFastError::archive(
                &zip_path,
                format!("archive does not contain {}", facet.marcxml_file_name()),
            ));
        }

        info!(bytes, %sha256, path = %marcxml_path.display(), "archive extracted");

        Ok(DownloadedArchive {
            facet,
            url,
            zip_path,
            marcxml_path,
            bytes,
            sha256,
        })
    }

    /// Stream the response body of `url` to `dest`.
    ///
    /// The body lands in a `.part` file first and is renamed over `dest` only
    /// once complete. Returns the byte count and hex SHA-256.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<(u64, String)> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SubjectsFastError::retrieval(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubjectsFastError::retrieval(url, format!("HTTP {status}")));
        }

        let part = dest.with_extension("zip.part");
        let written = match Self::stream_body(&mut response, url, &part).await {
            Ok(digest) => tokio::fs::rename(&part, dest)
                .await
                .map(|()| digest)
                .map_err(|e| SubjectsFastError::io(dest, e)),
            Err(e) => Err(e),
        };
        if written.is_err() {
            if let Err(cleanup) = tokio::fs::remove_file(&part).await {
                debug!(path = %part.display(), error = %cleanup, "partial download not removed");
            }
        }

        let (bytes, sha256) = written?;
        debug!(bytes, path = %dest.display(), "archive written");
        Ok((bytes, sha256))
    }

    /// Write the body of `response` to `part`, hashing as it goes.
    async fn stream_body(
        response: &mut reqwest::Response,
        url: &str,
        part: &Path,
    ) -> Result<(u64, String)> {
        let mut file = tokio::io::BufWriter::new(
            tokio::fs::File::create(part)
                .await
                .map_err(|e| SubjectsFastError::io(part, e))?,
        );

        let mut hasher = Sha256::new();
        let mut bytes: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SubjectsFastError::retrieval(url, format!("failed to read body: {e}")))?
        {
            hasher.update(&chunk);
            bytes += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|e| SubjectsFastError::io(part, e))?;
        }
        file.flush().await.map_err(|e| SubjectsFastError::io(part, e))?;

        Ok((bytes, format!("{:x}", hasher.finalize())))
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Download and extract every facet archive of `table` into `target_dir`.
///
/// `target_dir` is created if absent. Returns one entry per facet in table
/// order. Existing files with the same names are overwritten; other files
/// are left alone.
pub async fn download(
    table: &FacetTable,
    target_dir: &Path,
    opts: &DownloadOptions,
) -> Result<Vec<DownloadedArchive>> {
    download_with(table, target_dir, opts, |_, _, _| {}).await
}

/// Like [`download`], calling `on_archive(archive, current, total)` after
/// each facet is fetched and extracted.
#[instrument(skip_all, fields(target = %target_dir.display(), facets = table.facets().len()))]
pub async fn download_with<F>(
    table: &FacetTable,
    target_dir: &Path,
    opts: &DownloadOptions,
    mut on_archive: F,
) -> Result<Vec<DownloadedArchive>>
where
    F: FnMut(&DownloadedArchive, usize, usize),
{
    tokio::fs::create_dir_all(target_dir)
        .await
        .map_err(|e| SubjectsFastError::io(target_dir, e))?;

    let downloader = Downloader::new(opts)?;
    let total = table.facets().len();
    let mut archives = Vec::with_capacity(total);
    for (i, &facet) in table.facets().iter().enumerate() {
        let archive = downloader.download_facet(table, facet, target_dir).await?;
        on_archive(&archive, i + 1, total);
        archives.push(archive);
    }

    info!(
        archives = archives.len(),
        bytes = archives.iter().map(|a| a.bytes).sum::<u64>(),
        "download complete"
    );
    Ok(archives)
}
