//! MARCXML → YAML subject vocabulary conversion.
//!
//! For each facet of a [`FacetTable`], reads `<source>/<ArchiveName>.marcxml`
//! record by record, maps every record to a [`SubjectEntry`] and streams the
//! entries to `<target>/subjects_fast_<suffix>.yaml`.
//!
//! A record missing its identifier or heading fails the whole run; there is no
//! skipping, so every output file holds exactly one entry per source record.

mod mapping;
mod yaml;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use subjects_fast_marcxml::MarcXmlReader;
use subjects_fast_shared::{Facet, FacetTable, Result, SubjectsFastError};
use tracing::{debug, info, instrument, warn};

pub use mapping::map_record;
pub use yaml::YamlSequenceWriter;

/// Outcome of converting one facet.
#[derive(Debug, Clone)]
pub struct ConvertedFacet {
    pub facet: Facet,
    /// The MARCXML file read.
    pub source: PathBuf,
    /// The YAML file written.
    pub output: PathBuf,
    /// Number of entries written (equals the number of source records).
    pub entries: usize,
}

/// Summary of a [`convert`] run.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Facets that were requested, in order.
    pub requested: Vec<Facet>,
    /// Facets converted, in order.
    pub converted: Vec<ConvertedFacet>,
}

impl ConversionReport {
    /// True when every requested facet produced its YAML file.
    pub fn all_converted(&self) -> bool {
        self.requested.len() == self.converted.len()
            && self
                .requested
                .iter()
                .zip(&self.converted)
                .all(|(want, got)| *want == got.facet)
    }

    /// Total entries written across all facets.
    pub fn total_entries(&self) -> usize {
        self.converted.iter().map(|c| c.entries).sum()
    }
}

/// Convert every facet of `table` from `source_dir` into `target_dir`.
///
/// `target_dir` is created if absent. Stops at the first failing facet; YAML
/// files of facets converted before the failure remain on disk.
pub fn convert(table: &FacetTable, source_dir: &Path, target_dir: &Path) -> Result<ConversionReport> {
    convert_with(table, source_dir, target_dir, |_, _, _| {})
}

/// Like [`convert`], calling `on_facet(converted, current, total)` after each
/// facet's YAML file is in place.
#[instrument(skip_all, fields(source = %source_dir.display(), target = %target_dir.display()))]
pub fn convert_with<F>(
    table: &FacetTable,
    source_dir: &Path,
    target_dir: &Path,
    mut on_facet: F,
) -> Result<ConversionReport>
where
    F: FnMut(&ConvertedFacet, usize, usize),
{
    std::fs::create_dir_all(target_dir).map_err(|e| SubjectsFastError::io(target_dir, e))?;

    let total = table.facets().len();
    let mut converted = Vec::with_capacity(total);
    for (i, &facet) in table.facets().iter().enumerate() {
        let result = convert_facet(facet, source_dir, target_dir)?;
        on_facet(&result, i + 1, total);
        converted.push(result);
    }

    let report = ConversionReport {
        requested: table.facets().to_vec(),
        converted,
    };
    info!(
        facets = report.converted.len(),
        entries = report.total_entries(),
        "conversion complete"
    );
    Ok(report)
}

/// Convert a single facet. `target_dir` must exist.
///
/// The YAML is written to a hidden temp file and renamed into place, so a
/// failure never leaves a partial `subjects_fast_*.yaml` behind.
#[instrument(skip_all, fields(facet = %facet))]
pub fn convert_facet(facet: Facet, source_dir: &Path, target_dir: &Path) -> Result<ConvertedFacet> {
    let source = source_dir.join(facet.marcxml_file_name());
    let output = target_dir.join(facet.output_file_name());
    let temp = target_dir.join(format!(".{}.tmp", facet.output_file_name()));

    let entries = match write_entries(facet, &source, &temp) {
        Ok(count) => count,
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                debug!(path = %temp.display(), error = %cleanup, "temp file not removed");
            }
            warn!(source = %source.display(), error = %e, "facet conversion failed");
            return Err(e);
        }
    };

    std::fs::rename(&temp, &output).map_err(|e| SubjectsFastError::io(&output, e))?;
    info!(entries, output = %output.display(), "facet converted");

    Ok(ConvertedFacet {
        facet,
        source,
        output,
        entries,
    })
}

/// Stream records from `source` into a YAML sequence at `dest`.
fn write_entries(facet: Facet, source: &Path, dest: &Path) -> Result<usize> {
    let records = MarcXmlReader::open(source)?;
    let file = File::create(dest).map_err(|e| SubjectsFastError::io(dest, e))?;
    let mut writer = YamlSequenceWriter::new(BufWriter::new(file));

    for (index, record) in records.enumerate() {
        let record = record?;
        let entry = map_record(facet, &record, index + 1).map_err(|e| match e {
            SubjectsFastError::Parse { message } => {
                SubjectsFastError::parse(format!("{facet} facet, {}: {message}", source.display()))
            }
            other => other,
        })?;
        writer
            .push(&entry)
            .map_err(|e| SubjectsFastError::io(dest, e))?;
    }

    let (_, count) = writer.finish().map_err(|e| SubjectsFastError::io(dest, e))?;
    Ok(count)
}
