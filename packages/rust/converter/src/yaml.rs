//! Streaming YAML emitter for subject entries.
//!
//! Output is a block sequence of mappings with keys in the fixed order
//! `id`, `scheme`, `subject`. `id` and `subject` are YAML double-quoted
//! scalars; `scheme` is a fixed label and stays plain. An empty sequence is
//! written as `[]`.

use std::io::{self, Write};

use subjects_fast_shared::SubjectEntry;

pub struct YamlSequenceWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> YamlSequenceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Append one entry to the sequence.
    pub fn push(&mut self, entry: &SubjectEntry) -> io::Result<()> {
        writeln!(self.out, "- id: {}", quoted(&entry.id))?;
        writeln!(self.out, "  scheme: {}", entry.scheme)?;
        writeln!(self.out, "  subject: {}", quoted(&entry.subject))?;
        self.written += 1;
        Ok(())
    }

    /// Close the document and hand back the writer and the entry count.
    pub fn finish(mut self) -> io::Result<(W, usize)> {
        if self.written == 0 {
            writeln!(self.out, "[]")?;
        }
        self.out.flush()?;
        Ok((self.out, self.written))
    }
}

/// Render `value` as a YAML double-quoted scalar.
///
/// Every character YAML forbids or folds in a quoted scalar is escaped: C0,
/// DEL and C1 controls (MARC non-sort markers U+0098/U+009C included), the
/// Unicode line and paragraph separators, and the byte order mark.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            '\u{feff}' => out.push_str("\\uFEFF"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
