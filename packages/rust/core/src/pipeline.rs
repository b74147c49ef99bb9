//! End-to-end `refresh` pipeline: remote archives → extracted MARCXML → YAML.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use subjects_fast_converter::{ConversionReport, ConvertedFacet};
use subjects_fast_downloader::{DownloadOptions, DownloadedArchive};
use subjects_fast_shared::{Facet, FacetTable, Result};

/// Configuration for the `refresh` pipeline.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Remote location and facet selection.
    pub table: FacetTable,
    /// Where archives are downloaded and extracted.
    pub download_dir: PathBuf,
    /// Where the YAML vocabularies are written.
    pub vocabularies_dir: PathBuf,
    /// HTTP settings.
    pub download: DownloadOptions,
}

/// Result of the `refresh` pipeline.
#[derive(Debug)]
pub struct RefreshResult {
    /// Archives fetched, in facet order.
    pub archives: Vec<DownloadedArchive>,
    /// Conversion summary.
    pub conversion: ConversionReport,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each archive is fetched and extracted.
    fn archive_downloaded(&self, archive: &DownloadedArchive, current: usize, total: usize);
    /// Called after each facet's YAML is written.
    fn facet_converted(&self, converted: &ConvertedFacet, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &RefreshResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn archive_downloaded(&self, _archive: &DownloadedArchive, _current: usize, _total: usize) {}
    fn facet_converted(&self, _converted: &ConvertedFacet, _current: usize, _total: usize) {}
    fn done(&self, _result: &RefreshResult) {}
}

/// Run the full `refresh` pipeline.
///
/// 1. Download and extract every facet archive
/// 2. Convert every extracted MARCXML file to YAML
///
/// Fails fast: the first facet that cannot be fetched or converted aborts the
/// run, and no conversion starts unless every download succeeded.
#[instrument(skip_all, fields(base_url = %config.table.base_url(), facets = config.table.facets().len()))]
pub async fn refresh(config: &RefreshConfig, progress: &dyn ProgressReporter) -> Result<RefreshResult> {
    let start = Instant::now();

    // --- Phase 1: Download ---
    progress.phase("Downloading FAST archives");
    let archives = subjects_fast_downloader::download_with(
        &config.table,
        &config.download_dir,
        &config.download,
        |archive, current, total| progress.archive_downloaded(archive, current, total),
    )
    .await?;

    // --- Phase 2: Convert ---
    progress.phase("Converting MARCXML to YAML");
    let conversion = subjects_fast_converter::convert_with(
        &config.table,
        &config.download_dir,
        &config.vocabularies_dir,
        |converted, current, total| progress.facet_converted(converted, current, total),
    )?;

    let result = RefreshResult {
        archives,
        conversion,
        elapsed: start.elapsed(),
    };

    info!(
        facets = result.conversion.converted.len(),
        entries = result.conversion.total_entries(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "refresh complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Parse a list of facet names (`personal`, `FASTTopical`, ...) into a
/// facet table restricted to them. An empty list keeps all nine.
pub fn select_facets(table: FacetTable, names: &[String]) -> Result<FacetTable> {
    if names.is_empty() {
        return Ok(table);
    }
    let selected = names
        .iter()
        .map(|n| n.parse::<Facet>())
        .collect::<Result<Vec<_>>>()?;
    table.with_facets(&selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Mutex;

    use subjects_fast_shared::SubjectEntry;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURES: &str = "../../../fixtures/marcxml";

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "subjects-fast-pipeline-test-{}",
            uuid::Uuid::now_v7()
        ))
    }

    fn zip_bytes(name: &str, content: &[u8]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap().into_inner()
    }

    async fn serve_fixture(server: &MockServer, facet: Facet, marcxml: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/fast/{}", facet.zip_file_name())))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(zip_bytes(&facet.marcxml_file_name(), marcxml)),
            )
            .mount(server)
            .await;
    }

    fn config_for(server: &MockServer, root: &Path) -> RefreshConfig {
        RefreshConfig {
            table: FacetTable::new(&format!("{}/fast", server.uri())).unwrap(),
            download_dir: root.join("downloads"),
            vocabularies_dir: root.join("vocabularies"),
            download: DownloadOptions::default(),
        }
    }

    /// Records every callback for assertions.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.events.lock().unwrap().push(format!("phase:{name}"));
        }
        fn archive_downloaded(&self, archive: &DownloadedArchive, current: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("download:{}:{current}/{total}", archive.facet));
        }
        fn facet_converted(&self, converted: &ConvertedFacet, current: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("convert:{}:{current}/{total}", converted.facet));
        }
        fn done(&self, _result: &RefreshResult) {
            self.events.lock().unwrap().push("done".into());
        }
    }

    #[tokio::test]
    async fn refresh_downloads_and_converts_everything() {
        let server = MockServer::start().await;
        for facet in Facet::ALL {
            let marcxml = std::fs::read(format!("{FIXTURES}/{}", facet.marcxml_file_name())).unwrap();
            serve_fixture(&server, facet, &marcxml).await;
        }

        let root = temp_dir();
        let config = config_for(&server, &root);
        let result = refresh(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.archives.len(), 9);
        assert!(result.conversion.all_converted());
        for facet in Facet::ALL {
            assert!(config.download_dir.join(facet.zip_file_name()).exists());
            assert!(config.download_dir.join(facet.marcxml_file_name()).exists());
            assert!(config.vocabularies_dir.join(facet.output_file_name()).exists());
        }

        let yaml = std::fs::read_to_string(config.vocabularies_dir.join("subjects_fast_personal.yaml"))
            .unwrap();
        let entries: Vec<SubjectEntry> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            entries,
            vec![
                SubjectEntry::new(Facet::Personal, "1", "Mizner, Addison, 1872-1933"),
                SubjectEntry::new(Facet::Personal, "2", "Thatcher, Margaret"),
            ]
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn refresh_reports_progress_in_order() {
        let server = MockServer::start().await;
        serve_fixture(&server, Facet::Title, b"<collection/>").await;
        serve_fixture(&server, Facet::Meeting, b"").await;

        let root = temp_dir();
        let mut config = config_for(&server, &root);
        config.table = select_facets(config.table, &["meeting".into(), "title".into()]).unwrap();

        let progress = RecordingProgress::default();
        let result = refresh(&config, &progress).await.unwrap();
        assert_eq!(result.conversion.total_entries(), 0);

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(
            events,
            [
                "phase:Downloading FAST archives",
                "download:title:1/2",
                "download:meeting:2/2",
                "phase:Converting MARCXML to YAML",
                "convert:title:1/2",
                "convert:meeting:2/2",
                "done",
            ]
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn failed_download_skips_conversion() {
        let server = MockServer::start().await;
        let personal = std::fs::read(format!("{FIXTURES}/FASTPersonal.marcxml")).unwrap();
        serve_fixture(&server, Facet::Personal, &personal).await;
        Mock::given(method("GET"))
            .and(path("/fast/FASTCorporate.marcxml.zip"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let root = temp_dir();
        let config = config_for(&server, &root);
        let err = refresh(&config, &SilentProgress).await.unwrap_err();

        assert!(err.to_string().contains("FASTCorporate.marcxml.zip"));
        assert!(!config.vocabularies_dir.exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn select_facets_parses_names() {
        let table = select_facets(FacetTable::default(), &["FASTGeographic".into(), "event".into()])
            .unwrap();
        assert_eq!(table.facets(), &[Facet::Event, Facet::Geographic]);

        let table = select_facets(FacetTable::default(), &[]).unwrap();
        assert_eq!(table.facets().len(), 9);

        assert!(select_facets(FacetTable::default(), &["bogus".into()]).is_err());
    }
}
