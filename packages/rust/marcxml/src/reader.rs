//! Streaming MARCXML reader built on `quick-xml`.
//!
//! Element names are matched on their local part, so both
//! `<record>` and `<marc:record>` are accepted. Anything outside the
//! leader/controlfield/datafield/subfield structure is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use subjects_fast_shared::{Result, SubjectsFastError};
use tracing::debug;

use crate::record::{ControlField, DataField, MarcRecord, Subfield};

/// What the text currently being accumulated belongs to.
enum TextTarget {
    Leader,
    Control(String),
    Subfield(char),
}

/// Iterator over the records of a MARCXML document.
///
/// Yields records in document order. After the first error the iterator is
/// exhausted.
pub struct MarcXmlReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Label used in error messages (usually the file path).
    source: String,
    finished: bool,
}

impl MarcXmlReader<BufReader<File>> {
    /// Open a MARCXML file for streaming.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SubjectsFastError::io(path, e))?;
        debug!(path = %path.display(), "opened MARCXML file");
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> MarcXmlReader<R> {
    /// Wrap any buffered reader. `source` names the input in error messages.
    pub fn from_reader(inner: R, source: impl Into<String>) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::new(),
            source: source.into(),
            finished: false,
        }
    }

    /// Read up to and including the next `</record>`.
    /// Returns `None` at end of document.
    fn read_record(&mut self) -> Result<Option<MarcRecord>> {
        let Self {
            reader,
            buf,
            source,
            ..
        } = self;
        let source = source.as_str();

        let mut record: Option<MarcRecord> = None;
        let mut field: Option<DataField> = None;
        let mut target: Option<TextTarget> = None;
        let mut text = String::new();

        loop {
            buf.clear();
            let event = match reader.read_event_into(buf) {
                Ok(event) => event,
                Err(e) => return Err(malformed(source, reader.buffer_position(), e)),
            };
            let position = reader.buffer_position();

            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"record" => {
                        if record.is_some() {
                            return Err(malformed(source, position, "nested <record>"));
                        }
                        record = Some(MarcRecord::default());
                    }
                    b"leader" if record.is_some() => {
                        target = Some(TextTarget::Leader);
                        text.clear();
                    }
                    b"controlfield" if record.is_some() => {
                        let tag = required_attribute(&e, "tag", source, position)?;
                        target = Some(TextTarget::Control(tag));
                        text.clear();
                    }
                    b"datafield" if record.is_some() => {
                        field = Some(data_field(&e, source, position)?);
                    }
                    b"subfield" if field.is_some() => {
                        let code = subfield_code(&e, source, position)?;
                        target = Some(TextTarget::Subfield(code));
                        text.clear();
                    }
                    _ => {}
                },

                Event::Empty(e) => match e.local_name().as_ref() {
                    b"record" if record.is_none() => return Ok(Some(MarcRecord::default())),
                    b"controlfield" => {
                        if let Some(rec) = record.as_mut() {
                            rec.control_fields.push(ControlField {
                                tag: required_attribute(&e, "tag", source, position)?,
                                value: String::new(),
                            });
                        }
                    }
                    b"datafield" => {
                        if let Some(rec) = record.as_mut() {
                            rec.data_fields.push(data_field(&e, source, position)?);
                        }
                    }
                    b"subfield" => {
                        if let Some(f) = field.as_mut() {
                            f.subfields.push(Subfield {
                                code: subfield_code(&e, source, position)?,
                                value: String::new(),
                            });
                        }
                    }
                    _ => {}
                },

                Event::Text(t) if target.is_some() => {
                    let value = t.unescape().map_err(|e| malformed(source, position, e))?;
                    text.push_str(&value);
                }

                Event::CData(c) if target.is_some() => {
                    let value = std::str::from_utf8(&c)
                        .map_err(|e| malformed(source, position, e))?;
                    text.push_str(value);
                }

                Event::End(e) => match e.local_name().as_ref() {
                    b"leader" | b"controlfield" | b"subfield" => {
                        let value = std::mem::take(&mut text);
                        match (target.take(), record.as_mut()) {
                            (Some(TextTarget::Leader), Some(rec)) => rec.leader = Some(value),
                            (Some(TextTarget::Control(tag)), Some(rec)) => {
                                rec.control_fields.push(ControlField { tag, value });
                            }
                            (Some(TextTarget::Subfield(code)), _) => {
                                if let Some(f) = field.as_mut() {
                                    f.subfields.push(Subfield { code, value });
                                }
                            }
                            _ => {}
                        }
                    }
                    b"datafield" => {
                        if let (Some(f), Some(rec)) = (field.take(), record.as_mut()) {
                            rec.data_fields.push(f);
                        }
                    }
                    b"record" => {
                        if let Some(rec) = record.take() {
                            return Ok(Some(rec));
                        }
                    }
                    _ => {}
                },

                Event::Eof => {
                    if record.is_some() {
                        return Err(malformed(
                            source,
                            position,
                            "document ends inside a <record>",
                        ));
                    }
                    return Ok(None);
                }

                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for MarcXmlReader<R> {
    type Item = Result<MarcRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn malformed(
    source: &str,
    position: impl std::fmt::Display,
    cause: impl std::fmt::Display,
) -> SubjectsFastError {
    SubjectsFastError::parse(format!(
        "{source}: malformed MARCXML at byte {position}: {cause}"
    ))
}

fn attribute(e: &BytesStart<'_>, name: &str) -> std::result::Result<Option<String>, quick_xml::Error> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn required_attribute(
    e: &BytesStart<'_>,
    name: &str,
    source: &str,
    position: u64,
) -> Result<String> {
    attribute(e, name)
        .map_err(|err| malformed(source, position, err))?
        .ok_or_else(|| {
            let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
            malformed(source, position, format!("<{element}> without '{name}' attribute"))
        })
}

/// Indicators default to blank when absent or empty.
fn indicator(e: &BytesStart<'_>, name: &str, source: &str, position: u64) -> Result<char> {
    let value = attribute(e, name).map_err(|err| malformed(source, position, err))?;
    Ok(value.and_then(|v| v.chars().next()).unwrap_or(' '))
}

fn data_field(e: &BytesStart<'_>, source: &str, position: u64) -> Result<DataField> {
    Ok(DataField {
        tag: required_attribute(e, "tag", source, position)?,
        ind1: indicator(e, "ind1", source, position)?,
        ind2: indicator(e, "ind2", source, position)?,
        subfields: Vec::new(),
    })
}

fn subfield_code(e: &BytesStart<'_>, source: &str, position: u64) -> Result<char> {
    let code = required_attribute(e, "code", source, position)?;
    code.chars()
        .next()
        .ok_or_else(|| malformed(source, position, "<subfield> with empty code"))
}
