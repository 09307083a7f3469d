//! Cheap point-in-time views of a tree.
//!
//! Because nodes are immutable, a snapshot is just a captured root plus a way
//! to reach the byte buffers. The owning flavor clones the buffer collection
//! (Arc bumps, no text copies) and stays valid after the parent tree is
//! dropped; the referencing flavor borrows the parent's collection for its
//! lifetime. Both expose the read-only query surface and are walkable.

use crate::buffer::BufferCollection;
use crate::text_buffer;
use crate::tree::RedBlackTree;
use crate::types::{BufferMeta, IncompleteCRLF, LineRange};
use crate::walker::{ReverseTreeWalker, TreeWalker};

/// A snapshot that keeps the underlying buffers alive on its own.
///
/// ```
/// use textbuf_core::TextBuffer;
///
/// let mut tree = TextBuffer::from_bytes(b"before");
/// let snap = tree.owning_snap();
/// tree.insert(0, b"now ");
/// let mut buf = Vec::new();
/// snap.get_line_content(1, &mut buf);
/// assert_eq!(buf, b"before");
/// ```
#[derive(Debug, Clone)]
pub struct OwningSnapshot {
    root: RedBlackTree,
    meta: BufferMeta,
    buffers: BufferCollection,
}

impl OwningSnapshot {
    pub(crate) fn new(root: RedBlackTree, meta: BufferMeta, buffers: BufferCollection) -> Self {
        Self {
            root,
            meta,
            buffers,
        }
    }

    /// Total length of the snapped document in bytes.
    pub fn length(&self) -> usize {
        self.meta.total_content_length
    }

    /// Whether the snapped document holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.meta.total_content_length == 0
    }

    /// Number of line feeds in the snapped document.
    pub fn line_feed_count(&self) -> usize {
        self.meta.lf_count
    }

    /// Number of lines; always `line_feed_count() + 1`.
    pub fn line_count(&self) -> usize {
        self.meta.lf_count + 1
    }

    /// The byte at `offset`, or 0 when out of range.
    pub fn at(&self, offset: usize) -> u8 {
        text_buffer::char_at(&self.buffers, &self.root, offset)
    }

    /// 1-based line containing `offset`.
    pub fn line_at(&self, offset: usize) -> usize {
        text_buffer::line_at(&self.buffers, &self.root, offset)
    }

    /// Offset range of `line`, excluding its terminating line feed.
    pub fn get_line_range(&self, line: usize) -> LineRange {
        text_buffer::line_range(&self.buffers, &self.root, line)
    }

    /// Offset range of `line`, including its terminating line feed.
    pub fn get_line_range_with_newline(&self, line: usize) -> LineRange {
        text_buffer::line_range_with_newline(&self.buffers, &self.root, line)
    }

    /// Offset range of `line`, excluding a terminating `\r\n` pair as a whole.
    pub fn get_line_range_crlf(&self, line: usize) -> LineRange {
        text_buffer::line_range_crlf(&self.buffers, &self.root, line)
    }

    /// Replace `buf` with the content of `line`, without its line feed.
    pub fn get_line_content(&self, line: usize, buf: &mut Vec<u8>) {
        text_buffer::line_content(buf, &self.buffers, &self.root, self.meta, line);
    }

    /// Replace `buf` with the content of `line`, stripping a terminating
    /// `\r\n` pair. Reports whether the line ended in a lone `\n`.
    pub fn get_line_content_crlf(&self, line: usize, buf: &mut Vec<u8>) -> IncompleteCRLF {
        text_buffer::line_content_crlf(buf, &self.buffers, &self.root, self.meta, line)
    }

    /// Forward walker over the snapped document.
    pub fn walker(&self) -> TreeWalker<'_> {
        self.walker_at(0)
    }

    /// Forward walker starting at `offset`.
    pub fn walker_at(&self, offset: usize) -> TreeWalker<'_> {
        TreeWalker::from_parts(&self.buffers, self.root.clone(), self.meta, offset)
    }

    /// Reverse walker starting at the last byte.
    pub fn reverse_walker(&self) -> ReverseTreeWalker<'_> {
        self.reverse_walker_at(self.length().saturating_sub(1))
    }

    /// Reverse walker starting at `offset` (clamped to the last byte).
    pub fn reverse_walker_at(&self, offset: usize) -> ReverseTreeWalker<'_> {
        let offset = offset.min(self.length().saturating_sub(1));
        ReverseTreeWalker::from_parts(&self.buffers, self.root.clone(), self.meta, offset)
    }
}

/// A snapshot borrowing the parent tree's buffers.
///
/// Valid only while the parent tree is alive, in exchange for not touching
/// any reference counts on construction.
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot<'a> {
    root: RedBlackTree,
    meta: BufferMeta,
    buffers: &'a BufferCollection,
}

impl<'a> ReferenceSnapshot<'a> {
    pub(crate) fn new(root: RedBlackTree, meta: BufferMeta, buffers: &'a BufferCollection) -> Self {
        Self {
            root,
            meta,
            buffers,
        }
    }

    /// Total length of the snapped document in bytes.
    pub fn length(&self) -> usize {
        self.meta.total_content_length
    }

    /// Whether the snapped document holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.meta.total_content_length == 0
    }

    /// Number of line feeds in the snapped document.
    pub fn line_feed_count(&self) -> usize {
        self.meta.lf_count
    }

    /// Number of lines; always `line_feed_count() + 1`.
    pub fn line_count(&self) -> usize {
        self.meta.lf_count + 1
    }

    /// The byte at `offset`, or 0 when out of range.
    pub fn at(&self, offset: usize) -> u8 {
        text_buffer::char_at(self.buffers, &self.root, offset)
    }

    /// 1-based line containing `offset`.
    pub fn line_at(&self, offset: usize) -> usize {
        text_buffer::line_at(self.buffers, &self.root, offset)
    }

    /// Offset range of `line`, excluding its terminating line feed.
    pub fn get_line_range(&self, line: usize) -> LineRange {
        text_buffer::line_range(self.buffers, &self.root, line)
    }

    /// Offset range of `line`, including its terminating line feed.
    pub fn get_line_range_with_newline(&self, line: usize) -> LineRange {
        text_buffer::line_range_with_newline(self.buffers, &self.root, line)
    }

    /// Offset range of `line`, excluding a terminating `\r\n` pair as a whole.
    pub fn get_line_range_crlf(&self, line: usize) -> LineRange {
        text_buffer::line_range_crlf(self.buffers, &self.root, line)
    }

    /// Replace `buf` with the content of `line`, without its line feed.
    pub fn get_line_content(&self, line: usize, buf: &mut Vec<u8>) {
        text_buffer::line_content(buf, self.buffers, &self.root, self.meta, line);
    }

    /// Replace `buf` with the content of `line`, stripping a terminating
    /// `\r\n` pair. Reports whether the line ended in a lone `\n`.
    pub fn get_line_content_crlf(&self, line: usize, buf: &mut Vec<u8>) -> IncompleteCRLF {
        text_buffer::line_content_crlf(buf, self.buffers, &self.root, self.meta, line)
    }

    /// Forward walker over the snapped document.
    pub fn walker(&self) -> TreeWalker<'a> {
        self.walker_at(0)
    }

    /// Forward walker starting at `offset`.
    pub fn walker_at(&self, offset: usize) -> TreeWalker<'a> {
        TreeWalker::from_parts(self.buffers, self.root.clone(), self.meta, offset)
    }

    /// Reverse walker starting at the last byte.
    pub fn reverse_walker(&self) -> ReverseTreeWalker<'a> {
        self.reverse_walker_at(self.length().saturating_sub(1))
    }

    /// Reverse walker starting at `offset` (clamped to the last byte).
    pub fn reverse_walker_at(&self, offset: usize) -> ReverseTreeWalker<'a> {
        let offset = offset.min(self.length().saturating_sub(1));
        ReverseTreeWalker::from_parts(self.buffers, self.root.clone(), self.meta, offset)
    }
}
