//! Span-based text edits applied to in-memory module sources.
//!
//! Every mutation the migration performs is expressed as a [`TextEdit`] against the
//! current source text of a module. Edits touch only the bytes they cover, so
//! formatting and comments elsewhere in the file survive untouched.

use std::ops::Range;

use log::{trace, warn};

/// Replacement of a byte range of a module's source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range in the source being replaced (empty for insertions)
    pub range: Range<usize>,
    /// Text written in place of `range`
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.range.start < other.range.end && other.range.start < self.range.end
    }
}

/// Apply a batch of edits to `source`.
///
/// Edits are applied in source order. An edit overlapping one already accepted is
/// dropped with a warning, and exact duplicates are collapsed. Returns the new text and
/// the number of edits that were applied.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> (String, usize) {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut accepted: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if edit.range.end > source.len() || edit.range.start > edit.range.end {
            warn!("Dropping out-of-bounds edit {:?}", edit.range);
            continue;
        }
        if let Some(last) = accepted.last() {
            if *last == edit {
                continue;
            }
            if last.overlaps(&edit) {
                warn!(
                    "Dropping edit {:?} overlapping earlier edit {:?}",
                    edit.range, last.range
                );
                continue;
            }
        }
        accepted.push(edit);
    }

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &accepted {
        trace!("Applying edit {:?} -> {:?}", edit.range, edit.replacement);
        output.push_str(&source[cursor..edit.range.start]);
        output.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    output.push_str(&source[cursor..]);

    (output, accepted.len())
}

/// Widen the range of a statement so that deleting it removes the whole line.
///
/// If the statement is alone on its line, the line and its newline are removed. A blank
/// line left directly above is also removed when the statement is followed by another
/// blank line or by the end of the file, so removal never leaves doubled blank lines.
pub fn statement_removal_range(source: &str, range: Range<usize>) -> Range<usize> {
    let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[range.end..]
        .find('\n')
        .map_or(source.len(), |i| range.end + i + 1);

    let owns_start = source[line_start..range.start].trim().is_empty();
    let owns_end = source[range.end..line_end].trim().is_empty();
    if !(owns_start && owns_end) {
        return range;
    }

    let mut start = line_start;
    let end = line_end;
    let at_eof = source[end..].trim().is_empty();
    let next_line_blank = at_eof || {
        let next_end = source[end..].find('\n').map_or(source.len(), |i| end + i);
        source[end..next_end].trim().is_empty()
    };
    if !next_line_blank {
        return start..end;
    }

    while start > 0 {
        let previous_start = source[..start - 1].rfind('\n').map_or(0, |i| i + 1);
        if !source[previous_start..start].trim().is_empty() {
            break;
        }
        start = previous_start;
        if !at_eof {
            break;
        }
    }

    start..end
}
