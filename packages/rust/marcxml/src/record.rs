//! In-memory shape of a MARC record.

/// A fixed-length control field (`00X`), e.g. `001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlField {
    pub tag: String,
    pub value: String,
}

/// A single-letter subfield inside a data field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    pub code: char,
    pub value: String,
}

/// A variable data field with indicators and repeatable subfields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    pub tag: String,
    pub ind1: char,
    pub ind2: char,
    /// Subfields in document order.
    pub subfields: Vec<Subfield>,
}

#[cfg(test)]
impl DataField {
    /// First subfield with the given code.
    pub(crate) fn subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }
}

/// One `<record>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarcRecord {
    pub leader: Option<String>,
    /// Control fields in document order.
    pub control_fields: Vec<ControlField>,
    /// Data fields in document order.
    pub data_fields: Vec<DataField>,
}

impl MarcRecord {
    /// Value of the first control field with `tag`.
    pub fn control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .iter()
            .find(|f| f.tag == tag)
            .map(|f| f.value.as_str())
    }

    /// First data field with `tag`.
    pub fn data_field(&self, tag: &str) -> Option<&DataField> {
        self.data_fields.iter().find(|f| f.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarcRecord {
        MarcRecord {
            leader: None,
            control_fields: vec![ControlField {
                tag: "001".into(),
                value: "fst00000001".into(),
            }],
            data_fields: vec![
                DataField {
                    tag: "100".into(),
                    ind1: '1',
                    ind2: ' ',
                    subfields: vec![
                        Subfield { code: 'a', value: "Mizner, Addison,".into() },
                        Subfield { code: 'd', value: "1872-1933".into() },
                    ],
                },
                DataField {
                    tag: "700".into(),
                    ind1: '1',
                    ind2: '7',
                    subfields: vec![Subfield { code: 'a', value: "Mizner, A.".into() }],
                },
                DataField {
                    tag: "700".into(),
                    ind1: '1',
                    ind2: '7',
                    subfields: vec![Subfield { code: 'a', value: "Mizner, Addison".into() }],
                },
            ],
        }
    }

    #[test]
    fn lookups() {
        let record = sample();
        assert_eq!(record.control_field("001"), Some("fst00000001"));
        assert_eq!(record.control_field("005"), None);

        let heading = record.data_field("100").unwrap();
        assert_eq!(heading.subfield('d'), Some("1872-1933"));
        assert_eq!(heading.subfield('q'), None);

        assert!(record.data_field("150").is_none());
    }
}
