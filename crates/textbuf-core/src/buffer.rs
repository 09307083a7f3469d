//! Storage substrate: immutable original buffers, the append-only
//! modification buffer, and the per-buffer line-start index.
//!
//! Original buffers are created once and never mutated; the modification
//! buffer grows only by appending. Both are shared through [`Arc`] so that
//! snapshots can retain them without copying the text.

use std::sync::Arc;

use memchr::memchr_iter;

use crate::types::{BufferCursor, BufferIndex};

/// A byte buffer plus the offsets at which each of its lines begins.
#[derive(Debug, Clone)]
pub(crate) struct CharBuffer {
    pub bytes: Vec<u8>,
    /// `line_starts[0]` is always 0; every further entry is one past a `\n`.
    pub line_starts: Vec<usize>,
}

impl CharBuffer {
    /// Build a buffer and its line-start index from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        let line_starts = populate_line_starts(&bytes);
        Self { bytes, line_starts }
    }

    /// The empty buffer. Keeps the single line-start entry of 0 so that
    /// line-feed counting can index it safely.
    pub fn empty() -> Self {
        Self {
            bytes: Vec::new(),
            line_starts: vec![0],
        }
    }
}

/// Scan `bytes` and return its line-start index: a leading 0 followed by one
/// entry one past every line feed.
pub(crate) fn populate_line_starts(bytes: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(memchr_iter(b'\n', bytes).map(|i| i + 1));
    starts
}

/// The set of buffers one tree (and its snapshots) reads from.
///
/// Original buffers are shared freely. The modification buffer is owned by
/// the tree through a copy-on-write handle: appending goes through
/// [`Arc::make_mut`], so cloning the collection for an owning snapshot is
/// O(1) and the first append after a snapshot copies the buffer once.
#[derive(Debug, Clone)]
pub(crate) struct BufferCollection {
    orig_buffers: Vec<Arc<CharBuffer>>,
    mod_buffer: Arc<CharBuffer>,
}

impl BufferCollection {
    pub fn new(orig_buffers: Vec<Arc<CharBuffer>>) -> Self {
        Self {
            orig_buffers,
            mod_buffer: Arc::new(CharBuffer::empty()),
        }
    }

    pub fn buffer_at(&self, index: BufferIndex) -> &CharBuffer {
        match index {
            BufferIndex::Original(i) => &self.orig_buffers[i],
            BufferIndex::Mod => &self.mod_buffer,
        }
    }

    /// Byte offset of `cursor` inside the buffer identified by `index`.
    pub fn buffer_offset(&self, index: BufferIndex, cursor: BufferCursor) -> usize {
        let starts = &self.buffer_at(index).line_starts;
        starts[cursor.line] + cursor.column
    }

    pub fn mod_buffer(&self) -> &CharBuffer {
        &self.mod_buffer
    }

    pub fn mod_buffer_mut(&mut self) -> &mut CharBuffer {
        Arc::make_mut(&mut self.mod_buffer)
    }

    pub fn orig_buffer_count(&self) -> usize {
        self.orig_buffers.len()
    }
}
