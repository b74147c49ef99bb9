//! Minimal MARCXML reader.
//!
//! Streams `<record>` elements out of a MARC21 slim document (with or without
//! a namespace prefix, inside a `<collection>` or standalone) and exposes their
//! control fields, data fields and subfields. Only the structure is decoded;
//! no MARC semantics live here.

mod reader;
mod record;

use std::path::Path;

use subjects_fast_shared::Result;

pub use reader::MarcXmlReader;
pub use record::{ControlField, DataField, MarcRecord, Subfield};

/// Read every record of a MARCXML file into memory, in document order.
pub fn read_records(path: &Path) -> Result<Vec<MarcRecord>> {
    MarcXmlReader::open(path)?.collect()
}
