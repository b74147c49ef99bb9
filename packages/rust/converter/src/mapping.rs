//! MARC field mapping: one authority record → one [`SubjectEntry`].
//!
//! - identifier: control field `001` (`fst00000001` → `1`)
//! - heading: the facet's `1XX` field, main subfields joined by a space,
//!   subdivisions (`$v $x $y $z`) joined by `--`, control subfields skipped

use std::sync::LazyLock;

use regex::Regex;
use subjects_fast_marcxml::{DataField, MarcRecord};
use subjects_fast_shared::{Facet, Result, SubjectEntry, SubjectsFastError};

/// Control field carrying the FAST record number.
const IDENTIFIER_TAG: &str = "001";

/// Form, general, chronological and geographic subdivisions.
const SUBDIVISION_CODES: [char; 4] = ['v', 'x', 'y', 'z'];

/// `fst00000001`, `00000001`, `1`, or a bare alphanumeric number.
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:fst)?([0-9A-Za-z]+)$").expect("identifier regex")
});

/// Map a record of `facet` to a subject entry.
///
/// `position` is the 1-based index of the record in its file and only
/// appears in error messages.
pub fn map_record(facet: Facet, record: &MarcRecord, position: usize) -> Result<SubjectEntry> {
    let raw_id = record
        .control_field(IDENTIFIER_TAG)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            SubjectsFastError::parse(format!(
                "record {position}: missing {IDENTIFIER_TAG} control field"
            ))
        })?;
    let identifier = normalize_identifier(raw_id).ok_or_else(|| {
        SubjectsFastError::parse(format!(
            "record {position}: unrecognized identifier '{raw_id}'"
        ))
    })?;

    let tag = facet.heading_tag();
    let field = record.data_field(tag).ok_or_else(|| {
        SubjectsFastError::parse(format!(
            "record {position} ({raw_id}): missing {tag} heading field"
        ))
    })?;
    let heading = heading_label(field);
    if heading.is_empty() {
        return Err(SubjectsFastError::parse(format!(
            "record {position} ({raw_id}): {tag} heading field is empty"
        )));
    }

    Ok(SubjectEntry::new(facet, &identifier, &heading))
}

/// Strip the `fst` prefix, and leading zeros from numeric identifiers.
fn normalize_identifier(raw: &str) -> Option<String> {
    let caps = IDENTIFIER_RE.captures(raw)?;
    let id = &caps[1];
    if id.bytes().all(|b| b.is_ascii_digit()) {
        let trimmed = id.trim_start_matches('0');
        Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    } else {
        Some(id.to_string())
    }
}

/// Display form of a heading field.
fn heading_label(field: &DataField) -> String {
    let mut label = String::new();
    for subfield in &field.subfields {
        if subfield.code.is_ascii_digit() {
            continue;
        }
        let value = subfield.value.split_whitespace().collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            continue;
        }
        if !label.is_empty() {
            let separator = if SUBDIVISION_CODES.contains(&subfield.code) {
                "--"
            } else {
                " "
            };
            label.push_str(separator);
        }
        label.push_str(&value);
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use subjects_fast_marcxml::{ControlField, Subfield};

    fn record(id: Option<&str>, tag: &str, subfields: &[(char, &str)]) -> MarcRecord {
        MarcRecord {
            leader: None,
            control_fields: id
                .map(|v| ControlField { tag: "001".into(), value: v.into() })
                .into_iter()
                .collect(),
            data_fields: vec![DataField {
                tag: tag.into(),
                ind1: ' ',
                ind2: ' ',
                subfields: subfields
                    .iter()
                    .map(|(code, value)| Subfield { code: *code, value: (*value).into() })
                    .collect(),
            }],
        }
    }

    #[test]
    fn identifier_normalization() {
        assert_eq!(normalize_identifier("fst00000001").as_deref(), Some("1"));
        assert_eq!(normalize_identifier("FST01423803").as_deref(), Some("1423803"));
        assert_eq!(normalize_identifier("00042").as_deref(), Some("42"));
        assert_eq!(normalize_identifier("7").as_deref(), Some("7"));
        assert_eq!(normalize_identifier("fst0000").as_deref(), Some("0"));
        assert_eq!(normalize_identifier("ocn0x12").as_deref(), Some("ocn0x12"));
        assert_eq!(normalize_identifier("fst 1"), None);
        assert_eq!(normalize_identifier("http://id.worldcat.org/fast/1"), None);
    }

    #[test]
    fn personal_heading() {
        let rec = record(
            Some("fst00000001"),
            "100",
            &[('a', "Mizner, Addison,"), ('d', "1872-1933")],
        );
        let entry = map_record(Facet::Personal, &rec, 1).unwrap();
        assert_eq!(entry.id, "http://id.worldcat.org/fast/1");
        assert_eq!(entry.scheme, "FAST-personal");
        assert_eq!(entry.subject, "1:Mizner, Addison, 1872-1933");
    }

    #[test]
    fn subdivisions_use_double_dash() {
        let rec = record(
            Some("fst01204155"),
            "151",
            &[('a', "United States"), ('z', "Florida"), ('z', "Palm Beach")],
        );
        let entry = map_record(Facet::Geographic, &rec, 1).unwrap();
        assert_eq!(entry.subject, "1204155:United States--Florida--Palm Beach");

        let rec = record(Some("fst2"), "150", &[('a', "Cooking"), ('x', "History"), ('y', "20th century")]);
        let entry = map_record(Facet::Topical, &rec, 1).unwrap();
        assert_eq!(entry.subject, "2:Cooking--History--20th century");
    }

    #[test]
    fn control_subfields_and_whitespace_are_dropped() {
        let rec = record(
            Some(" fst9 "),
            "155",
            &[('a', "  Maps \n "), ('0', "(OCoLC)fst9"), ('2', "fast"), ('v', "")],
        );
        let entry = map_record(Facet::FormGenre, &rec, 1).unwrap();
        assert_eq!(entry.subject, "9:Maps");
    }

    #[test]
    fn missing_identifier_fails() {
        let rec = record(None, "100", &[('a', "Thatcher, Margaret")]);
        let err = map_record(Facet::Personal, &rec, 4).unwrap_err();
        assert!(err.to_string().contains("record 4: missing 001"));

        let rec = record(Some("   "), "100", &[('a', "Thatcher, Margaret")]);
        assert!(map_record(Facet::Personal, &rec, 1).is_err());
    }

    #[test]
    fn heading_from_wrong_facet_fails() {
        let rec = record(Some("fst2"), "100", &[('a', "Thatcher, Margaret")]);
        let err = map_record(Facet::Corporate, &rec, 2).unwrap_err();
        assert!(err.to_string().contains("missing 110 heading field"));
    }

    #[test]
    fn empty_heading_fails() {
        let rec = record(Some("fst2"), "148", &[('a', " "), ('2', "fast")]);
        let err = map_record(Facet::Chronological, &rec, 1).unwrap_err();
        assert!(err.to_string().contains("148 heading field is empty"));
    }
}
