//! Line-oriented input formats.
//!
//! Evidence and query files are split into bracketed sections:
//!
//! ```text
//! [EVIDENCE]
//! rain 0.2 0.8
//! sprinkler 1 0
//!
//! [QUERY]
//! wet_grass
//! rain 1
//! ```
//!
//! A section starts after its header line and ends at the next line that
//! starts with `[` or at end of input. Modal-value files have no header:
//! every non-empty line is an entry. Only tokenization happens here; the
//! stores in [`crate::store`] interpret and validate the tokens.

use std::io::BufRead;

/// Section header for evidence entries.
pub const EVIDENCE_SECTION: &str = "[EVIDENCE]";

/// Section header for query entries.
pub const QUERY_SECTION: &str = "[QUERY]";

/// One tokenized entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    /// 1-based line number in the input.
    pub line: usize,
    /// First token (variable name).
    pub name: String,
    /// Remaining tokens.
    pub values: Vec<String>,
}

impl EntryLine {
    fn parse(line: usize, text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let name = tokens.next()?.to_string();
        Some(Self {
            line,
            name,
            values: tokens.map(str::to_string).collect(),
        })
    }
}

/// Read the entries of section `header`.
///
/// Returns an empty list when the header never appears. If the header
/// appears more than once, only the first occurrence is read. Bytes that
/// are not valid UTF-8 are replaced, so the affected entry is skipped
/// downstream while the rest of the section still applies.
pub fn read_section<R: BufRead>(reader: R, header: &str) -> std::io::Result<Vec<EntryLine>> {
    let mut entries = Vec::new();
    let mut inside = false;

    for_each_line(reader, |number, trimmed| {
        if !inside {
            inside = trimmed == header;
            return true;
        }
        if trimmed.starts_with('[') {
            return false;
        }
        if let Some(entry) = EntryLine::parse(number, trimmed) {
            entries.push(entry);
        }
        true
    })?;

    Ok(entries)
}

/// Read every non-empty line as an entry.
pub fn read_entries<R: BufRead>(reader: R) -> std::io::Result<Vec<EntryLine>> {
    let mut entries = Vec::new();
    for_each_line(reader, |number, trimmed| {
        if let Some(entry) = EntryLine::parse(number, trimmed) {
            entries.push(entry);
        }
        true
    })?;
    Ok(entries)
}

/// Feed each trimmed line and its 1-based number to `visit` until it
/// returns false or input ends.
fn for_each_line<R, F>(mut reader: R, mut visit: F) -> std::io::Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> bool,
{
    let mut buf = Vec::new();
    let mut number = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        number += 1;
        let line = String::from_utf8_lossy(&buf);
        if !visit(number, line.trim()) {
            return Ok(());
        }
    }
}
