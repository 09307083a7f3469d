//! Shared semantic types for the buffer kernel.
//!
//! Offsets are 0-based byte positions in the virtual document. Document lines
//! are 1-based; line number 0 is the sentinel meaning "before the document"
//! and is only meaningful as an input describing an empty range.

/// Identifies one backing byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BufferIndex {
    /// An immutable buffer supplied at construction time.
    Original(usize),
    /// The append-only modification buffer.
    Mod,
}

/// A line-relative coordinate inside a single buffer.
///
/// `line` is the 0-based line within that buffer's line-start index and
/// `column` the byte column within the line. Together with the line starts
/// this addresses one byte of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct BufferCursor {
    pub line: usize,
    pub column: usize,
}

/// Half-open offset range of one document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    /// Offset of the first byte of the line.
    pub first: usize,
    /// Offset one past the last byte reported for the line.
    pub last: usize,
}

/// Outcome of [`try_undo`](crate::TextBuffer::try_undo) /
/// [`try_redo`](crate::TextBuffer::try_redo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRedoResult {
    /// Whether a history entry was applied.
    pub success: bool,
    /// The editor-meaningful offset recorded with the applied entry
    /// (0 when `success` is false).
    pub op_offset: usize,
}

/// Whether an edit records an undo entry.
///
/// Mutations save the previous tree root into the undo stack by default;
/// passing [`SuppressHistory::Yes`] performs the edit without touching the
/// history stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressHistory {
    /// Record the edit in the undo history (the default behavior).
    No,
    /// Apply the edit without pushing an undo entry.
    Yes,
}

/// Reported by [`get_line_content_crlf`](crate::TextBuffer::get_line_content_crlf):
/// indicates the line was terminated by a lone `\n` with no preceding `\r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteCRLF {
    /// The line ended in `\r\n`, or it is the document's unterminated tail.
    No,
    /// The line ended in a `\n` that was not preceded by `\r`.
    Yes,
}

/// Aggregates of one tree root, recomputed after every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct BufferMeta {
    pub lf_count: usize,
    pub total_content_length: usize,
}
