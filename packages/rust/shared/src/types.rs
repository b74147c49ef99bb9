//! Core domain types: FAST facets, the facet table, and subject entries.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SubjectsFastError};

/// Remote directory the FAST MARCXML archives are published under.
pub const DEFAULT_BASE_URL: &str = "https://researchworks.oclc.org/researchdata/fast";

/// URI prefix for FAST authority records.
pub const FAST_ID_PREFIX: &str = "http://id.worldcat.org/fast/";

// ---------------------------------------------------------------------------
// Facet
// ---------------------------------------------------------------------------

/// One of the nine FAST vocabulary facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Personal,
    Corporate,
    Event,
    Title,
    Chronological,
    Topical,
    Geographic,
    FormGenre,
    Meeting,
}

impl Facet {
    /// All facets, in the fixed processing order.
    pub const ALL: [Facet; 9] = [
        Facet::Personal,
        Facet::Corporate,
        Facet::Event,
        Facet::Title,
        Facet::Chronological,
        Facet::Topical,
        Facet::Geographic,
        Facet::FormGenre,
        Facet::Meeting,
    ];

    /// Remote archive base name (case-sensitive), e.g. `FASTPersonal`.
    pub fn archive_name(self) -> &'static str {
        match self {
            Facet::Personal => "FASTPersonal",
            Facet::Corporate => "FASTCorporate",
            Facet::Event => "FASTEvent",
            Facet::Title => "FASTTitle",
            Facet::Chronological => "FASTChronological",
            Facet::Topical => "FASTTopical",
            Facet::Geographic => "FASTGeographic",
            Facet::FormGenre => "FASTFormGenre",
            Facet::Meeting => "FASTMeeting",
        }
    }

    /// Lowercase suffix used in output file names and on the command line.
    pub fn suffix(self) -> &'static str {
        match self {
            Facet::Personal => "personal",
            Facet::Corporate => "corporate",
            Facet::Event => "event",
            Facet::Title => "title",
            Facet::Chronological => "chronological",
            Facet::Topical => "topical",
            Facet::Geographic => "geographic",
            Facet::FormGenre => "formgenre",
            Facet::Meeting => "meeting",
        }
    }

    /// Scheme label written on every entry of this facet.
    pub fn scheme(self) -> &'static str {
        match self {
            Facet::Personal => "FAST-personal",
            Facet::Corporate => "FAST-corporate",
            Facet::Event => "FAST-event",
            Facet::Title => "FAST-title",
            Facet::Chronological => "FAST-chronological",
            Facet::Topical => "FAST-topical",
            Facet::Geographic => "FAST-geographic",
            Facet::FormGenre => "FAST-formgenre",
            Facet::Meeting => "FAST-meeting",
        }
    }

    /// MARC tag of the established heading field for this facet.
    pub fn heading_tag(self) -> &'static str {
        match self {
            Facet::Personal => "100",
            Facet::Corporate => "110",
            Facet::Meeting => "111",
            Facet::Title => "130",
            Facet::Event => "147",
            Facet::Chronological => "148",
            Facet::Topical => "150",
            Facet::Geographic => "151",
            Facet::FormGenre => "155",
        }
    }

    /// `FASTPersonal.marcxml.zip`
    pub fn zip_file_name(self) -> String {
        format!("{}.marcxml.zip", self.archive_name())
    }

    /// `FASTPersonal.marcxml`
    pub fn marcxml_file_name(self) -> String {
        format!("{}.marcxml", self.archive_name())
    }

    /// `subjects_fast_personal.yaml`
    pub fn output_file_name(self) -> String {
        format!("subjects_fast_{}.yaml", self.suffix())
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

impl std::str::FromStr for Facet {
    type Err = SubjectsFastError;

    /// Accepts the output suffix (`formgenre`) or the archive name
    /// (`FASTFormGenre`), case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Facet::ALL
            .into_iter()
            .find(|f| f.suffix() == wanted || f.archive_name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                SubjectsFastError::validation(format!(
                    "unknown facet '{s}': expected one of {}",
                    Facet::ALL.map(Facet::suffix).join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// FacetTable
// ---------------------------------------------------------------------------

/// Immutable run configuration shared by the downloader and the converter:
/// where archives live remotely and which facets to process, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetTable {
    base_url: Url,
    facets: Vec<Facet>,
}

impl FacetTable {
    /// All nine facets against the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            SubjectsFastError::config(format!("invalid base URL '{base_url}': {e}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SubjectsFastError::config(format!(
                "base URL must be http(s): {base_url}"
            )));
        }
        Ok(Self {
            base_url,
            facets: Facet::ALL.to_vec(),
        })
    }

    /// Restrict the table to a subset of facets. Order follows the fixed
    /// facet order regardless of the order given.
    pub fn with_facets(mut self, selected: &[Facet]) -> Result<Self> {
        if selected.is_empty() {
            return Err(SubjectsFastError::validation("facet selection is empty"));
        }
        self.facets = Facet::ALL
            .into_iter()
            .filter(|f| selected.contains(f))
            .collect();
        Ok(self)
    }

    /// Facets to process, in fixed order.
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Remote location of a facet's archive: `<base>/<ArchiveName>.marcxml.zip`.
    pub fn archive_url(&self, facet: Facet) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            facet.zip_file_name()
        )
    }
}

impl Default for FacetTable {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("default base URL is valid")
    }
}

// ---------------------------------------------------------------------------
// SubjectEntry
// ---------------------------------------------------------------------------

/// One converted subject, as written to the vocabulary YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    /// Authority URI, `http://id.worldcat.org/fast/<identifier>`.
    pub id: String,
    /// Facet scheme label, e.g. `FAST-personal`.
    pub scheme: String,
    /// `<identifier>:<heading>`.
    pub subject: String,
}

impl SubjectEntry {
    pub fn new(facet: Facet, identifier: &str, heading: &str) -> Self {
        Self {
            id: format!("{FAST_ID_PREFIX}{identifier}"),
            scheme: facet.scheme().to_string(),
            subject: format!("{identifier}:{heading}"),
        }
    }
}
