//! The text buffer: piece model, edit engine, position resolver, and the
//! line-oriented query surface.
//!
//! The document is the in-order concatenation of the pieces held by a
//! persistent red-black tree. Every edit produces a new root that shares the
//! unchanged majority of the previous tree; the previous root goes into the
//! undo history, which is what makes undo and redo O(1) root swaps.

use std::sync::Arc;

use crate::buffer::{BufferCollection, CharBuffer, populate_line_starts};
use crate::history::History;
use crate::snapshot::{OwningSnapshot, ReferenceSnapshot};
use crate::tree::{self, NodeData, Piece, RedBlackTree};
use crate::types::{
    BufferCursor, BufferIndex, BufferMeta, IncompleteCRLF, LineRange, SuppressHistory,
    UndoRedoResult,
};
use crate::walker::{ReverseTreeWalker, TreeWalker};

/// A node located by document offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodePosition {
    /// The piece held by the located node.
    pub piece: Piece,
    /// Offset of the located byte within the piece.
    pub remainder: usize,
    /// Document offset at which the piece starts.
    pub start_offset: usize,
    /// 1-based document line of the located byte.
    pub line: usize,
}

/// Accumulates a sequence of original byte blobs and creates the tree.
///
/// # Examples
///
/// ```
/// use textbuf_core::TreeBuilder;
///
/// let mut builder = TreeBuilder::new();
/// builder.accept(b"Hello, ");
/// builder.accept(b"World!");
/// let tree = builder.create();
/// assert_eq!(tree.length(), 13);
/// assert_eq!(tree.line_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    buffers: Vec<Arc<CharBuffer>>,
}

impl TreeBuilder {
    /// Create a builder with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one immutable original buffer, precomputing its line starts.
    pub fn accept(&mut self, bytes: &[u8]) {
        self.buffers.push(Arc::new(CharBuffer::new(bytes.to_vec())));
    }

    /// Consume the builder and create the tree over the accepted buffers.
    pub fn create(self) -> TextBuffer {
        TextBuffer::from_buffers(self.buffers)
    }
}

/// A text buffer backed by a persistent tree of pieces.
///
/// Offsets are 0-based byte positions; lines are 1-based with 0 meaning
/// "before the document". All operations are total: out-of-range insert
/// offsets clamp to the end of the document, removals clamp to the available
/// range, and queries for missing lines report an empty range.
///
/// # Examples
///
/// ```
/// use textbuf_core::TextBuffer;
///
/// let mut tree = TextBuffer::from_bytes(b"Hello, World!");
/// tree.insert(5, b" there");
/// assert_eq!(tree.length(), 19);
///
/// let r = tree.try_undo(0);
/// assert!(r.success);
/// assert_eq!(tree.length(), 13);
/// ```
#[derive(Debug)]
pub struct TextBuffer {
    buffers: BufferCollection,
    root: RedBlackTree,
    /// End cursor of the most recent append to the modification buffer.
    last_insert: BufferCursor,
    /// Document offset just past the previous insertion, for coalescing
    /// consecutive typing into one undo entry. `None` is the sentinel.
    end_last_insert: Option<usize>,
    meta: BufferMeta,
    history: History,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::from_buffers(Vec::new())
    }
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer over a single original blob.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut builder = TreeBuilder::new();
        builder.accept(bytes);
        builder.create()
    }

    fn from_buffers(buffers: Vec<Arc<CharBuffer>>) -> Self {
        let mut tree = Self {
            buffers: BufferCollection::new(buffers),
            root: RedBlackTree::new(),
            last_insert: BufferCursor::default(),
            end_last_insert: None,
            meta: BufferMeta::default(),
            history: History::default(),
        };
        tree.build_tree();
        tree
    }

    /// Insert one piece per non-empty original buffer, in order.
    fn build_tree(&mut self) {
        let mut offset = 0;
        for i in 0..self.buffers.orig_buffer_count() {
            let index = BufferIndex::Original(i);
            let buf = self.buffers.buffer_at(index);
            if buf.bytes.is_empty() {
                continue;
            }
            let last_line = buf.line_starts.len() - 1;
            let piece = Piece {
                index,
                first: BufferCursor::default(),
                last: BufferCursor {
                    line: last_line,
                    column: buf.bytes.len() - buf.line_starts[last_line],
                },
                length: buf.bytes.len(),
                newline_count: last_line,
            };
            self.root = self.root.insert(NodeData::new(piece), offset);
            offset += piece.length;
        }
        self.compute_buffer_meta();
    }

    // --- Queries. ---

    /// Total length of the document in bytes.
    pub fn length(&self) -> usize {
        self.meta.total_content_length
    }

    /// Whether the document holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.meta.total_content_length == 0
    }

    /// Number of line feeds in the document.
    pub fn line_feed_count(&self) -> usize {
        self.meta.lf_count
    }

    /// Number of lines; always `line_feed_count() + 1`.
    pub fn line_count(&self) -> usize {
        self.meta.lf_count + 1
    }

    /// The byte at `offset`, or 0 when out of range.
    pub fn at(&self, offset: usize) -> u8 {
        char_at(&self.buffers, &self.root, offset)
    }

    /// 1-based line containing `offset`; out-of-range offsets report the
    /// last line.
    pub fn line_at(&self, offset: usize) -> usize {
        line_at(&self.buffers, &self.root, offset)
    }

    /// Offset range of `line`, excluding its terminating line feed.
    pub fn get_line_range(&self, line: usize) -> LineRange {
        line_range(&self.buffers, &self.root, line)
    }

    /// Offset range of `line`, including its terminating line feed.
    pub fn get_line_range_with_newline(&self, line: usize) -> LineRange {
        line_range_with_newline(&self.buffers, &self.root, line)
    }

    /// Offset range of `line`, excluding a terminating `\r\n` pair as a whole.
    pub fn get_line_range_crlf(&self, line: usize) -> LineRange {
        line_range_crlf(&self.buffers, &self.root, line)
    }

    /// Replace `buf` with the content of `line`, without its line feed.
    pub fn get_line_content(&self, line: usize, buf: &mut Vec<u8>) {
        line_content(buf, &self.buffers, &self.root, self.meta, line);
    }

    /// Replace `buf` with the content of `line`, stripping a terminating
    /// `\r\n` pair. Reports whether the line ended in a lone `\n`.
    pub fn get_line_content_crlf(&self, line: usize, buf: &mut Vec<u8>) -> IncompleteCRLF {
        line_content_crlf(buf, &self.buffers, &self.root, self.meta, line)
    }

    // --- Walkers and snapshots. ---

    /// Forward walker over the whole document.
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

    /// Point-in-time view that keeps the underlying buffers alive on its own.
    pub fn owning_snap(&self) -> OwningSnapshot {
        OwningSnapshot::new(self.root.clone(), self.meta, self.buffers.clone())
    }

    /// Point-in-time view borrowing this tree's buffers.
    pub fn ref_snap(&self) -> ReferenceSnapshot<'_> {
        ReferenceSnapshot::new(self.root.clone(), self.meta, &self.buffers)
    }

    // --- History. ---

    /// Undo the most recent recorded edit. `op_offset` is stored with the
    /// state being left so a later redo can report it back.
    pub fn try_undo(&mut self, op_offset: usize) -> UndoRedoResult {
        match self.history.undo(self.root.clone(), op_offset) {
            Some(entry) => {
                self.root = entry.root;
                self.compute_buffer_meta();
                UndoRedoResult {
                    success: true,
                    op_offset: entry.op_offset,
                }
            }
            None => UndoRedoResult {
                success: false,
                op_offset: 0,
            },
        }
    }

    /// Re-apply the most recently undone edit.
    pub fn try_redo(&mut self, op_offset: usize) -> UndoRedoResult {
        match self.history.redo(self.root.clone(), op_offset) {
            Some(entry) => {
                self.root = entry.root;
                self.compute_buffer_meta();
                UndoRedoResult {
                    success: true,
                    op_offset: entry.op_offset,
                }
            }
            None => UndoRedoResult {
                success: false,
                op_offset: 0,
            },
        }
    }

    /// Push the current root onto the undo stack regardless of coalescing.
    /// The offset is reported back when this entry is undone to.
    pub fn commit_head(&mut self, offset: usize) {
        self.history.append_undo(self.root.clone(), offset);
    }

    /// The current root. Roots are cheap to clone and stay valid forever.
    pub fn head(&self) -> RedBlackTree {
        self.root.clone()
    }

    /// Jump to an arbitrary root previously produced by this tree.
    pub fn snap_to(&mut self, root: RedBlackTree) {
        self.root = root;
        self.compute_buffer_meta();
    }

    /// Whether an undo entry is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo entry is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Mutations. ---

    /// Insert `txt` before the byte at `offset`, recording an undo entry.
    /// Offsets past the end clamp to the end of the document.
    pub fn insert(&mut self, offset: usize, txt: &[u8]) {
        self.insert_with(offset, txt, SuppressHistory::No);
    }

    /// [`insert`](Self::insert) with explicit history control. Consecutive
    /// insertions that continue the previous one (the offset equals the end
    /// of the last insert) reuse the previous undo entry.
    pub fn insert_with(&mut self, offset: usize, txt: &[u8], suppress_history: SuppressHistory) {
        if txt.is_empty() {
            return;
        }
        let offset = offset.min(self.meta.total_content_length);
        if suppress_history == SuppressHistory::No
            && (self.end_last_insert != Some(offset) || self.root.is_empty())
        {
            self.history.append_undo(self.root.clone(), offset);
        }
        self.end_last_insert = Some(offset + txt.len());
        self.internal_insert(offset, txt);
        self.compute_buffer_meta();
        self.debug_validate();
    }

    /// Remove `count` bytes starting at `offset`, recording an undo entry.
    /// The range clamps to the end of the document.
    pub fn remove(&mut self, offset: usize, count: usize) {
        self.remove_with(offset, count, SuppressHistory::No);
    }

    /// [`remove`](Self::remove) with explicit history control.
    pub fn remove_with(&mut self, offset: usize, count: usize, suppress_history: SuppressHistory) {
        if self.root.is_empty() || offset >= self.meta.total_content_length {
            return;
        }
        let count = count.min(self.meta.total_content_length - offset);
        if count == 0 {
            return;
        }
        if suppress_history == SuppressHistory::No {
            self.history.append_undo(self.root.clone(), offset);
        }
        self.internal_remove(offset, count);
        self.compute_buffer_meta();
        self.debug_validate();
    }

    fn internal_insert(&mut self, offset: usize, txt: &[u8]) {
        if self.root.is_empty() {
            let piece = self.build_piece(txt);
            self.root = self.root.insert(NodeData::new(piece), 0);
            return;
        }

        // A non-empty tree always resolves; offsets past the end land on the
        // rightmost node with the remainder at its piece end.
        let Some(result) = node_at(&self.buffers, &self.root, offset) else {
            return;
        };
        let NodePosition {
            piece,
            remainder,
            start_offset: node_start_offset,
            ..
        } = result;
        let insert_pos = buffer_position(&self.buffers, &piece, remainder);

        // Inserting at the piece boundary or past the piece end needs no
        // split; a single new piece lands between the existing ones.
        if node_start_offset == offset || offset >= node_start_offset + piece.length {
            let new_piece = self.build_piece(txt);
            self.root = self.root.insert(NodeData::new(new_piece), offset);
            return;
        }

        // Inside the piece: split it around the insertion point and insert
        // left, middle, and right at contiguous offsets.
        let new_len_right = self.buffers.buffer_offset(piece.index, piece.last)
            - self.buffers.buffer_offset(piece.index, insert_pos);
        let new_piece_right = Piece {
            first: insert_pos,
            length: new_len_right,
            newline_count: line_feed_count(&insert_pos, &piece.last),
            ..piece
        };
        let new_piece_left = trim_piece_right(&self.buffers, &piece, insert_pos);
        let new_piece = self.build_piece(txt);

        self.root = self.root.remove(node_start_offset);
        self.root = self.root.insert(NodeData::new(new_piece_left), node_start_offset);
        let mid_offset = node_start_offset + new_piece_left.length;
        self.root = self.root.insert(NodeData::new(new_piece), mid_offset);
        let right_offset = mid_offset + new_piece.length;
        self.root = self.root.insert(NodeData::new(new_piece_right), right_offset);
    }

    fn internal_remove(&mut self, offset: usize, count: usize) {
        let Some(first) = node_at(&self.buffers, &self.root, offset) else {
            return;
        };
        let Some(last) = node_at(&self.buffers, &self.root, offset + count) else {
            return;
        };
        let start_split_pos = buffer_position(&self.buffers, &first.piece, first.remainder);

        // The range is held within a single node: remove it and re-insert
        // whatever survives on either side.
        if first.start_offset == last.start_offset {
            let end_split_pos = buffer_position(&self.buffers, &first.piece, last.remainder);
            if first.start_offset == offset {
                if count == first.piece.length {
                    self.root = self.root.remove(first.start_offset);
                    return;
                }
                let new_piece = trim_piece_left(&self.buffers, &first.piece, end_split_pos);
                self.root = self
                    .root
                    .remove(first.start_offset)
                    .insert(NodeData::new(new_piece), first.start_offset);
                return;
            }
            if first.start_offset + first.piece.length == offset + count {
                let new_piece = trim_piece_right(&self.buffers, &first.piece, start_split_pos);
                self.root = self
                    .root
                    .remove(first.start_offset)
                    .insert(NodeData::new(new_piece), first.start_offset);
                return;
            }
            let (left, right) =
                shrink_piece(&self.buffers, &first.piece, start_split_pos, end_split_pos);
            // Insert the right piece first so the left lands before it.
            self.root = self
                .root
                .remove(first.start_offset)
                .insert(NodeData::new(right), first.start_offset)
                .insert(NodeData::new(left), first.start_offset);
            return;
        }

        // The range spans nodes: remove whole nodes until the range is
        // consumed, then re-insert the trimmed survivors of both ends.
        let new_first = trim_piece_right(&self.buffers, &first.piece, start_split_pos);
        let end_split_pos = buffer_position(&self.buffers, &last.piece, last.remainder);
        let new_last = trim_piece_left(&self.buffers, &last.piece, end_split_pos);
        self.remove_node_range(first, count);
        // When the deletion ends exactly on a node boundary nothing of the
        // last node survives, and re-inserting it would duplicate content.
        if last.remainder != 0 && new_last.length != 0 {
            self.root = self.root.insert(NodeData::new(new_last), first.start_offset);
        }
        if new_first.length != 0 {
            self.root = self.root.insert(NodeData::new(new_first), first.start_offset);
        }
    }

    /// Remove whole nodes starting at `first` until `count` bytes measured
    /// from the located offset are covered. The first node is removed whole,
    /// so the target is extended by the prefix of it that the caller keeps.
    fn remove_node_range(&mut self, first: NodePosition, count: usize) {
        let length = count + first.remainder;
        let delete_at_offset = first.start_offset;
        let mut deleted_len = 0;
        let mut current = Some(first);
        while deleted_len < length {
            let Some(position) = current else {
                break;
            };
            deleted_len += position.piece.length;
            self.root = self.root.remove(delete_at_offset);
            current = node_at(&self.buffers, &self.root, delete_at_offset);
        }
    }

    /// Append `txt` to the modification buffer and describe it as a piece.
    fn build_piece(&mut self, txt: &[u8]) -> Piece {
        let start_offset = self.buffers.mod_buffer().bytes.len();
        let starts = populate_line_starts(txt);
        let start = self.last_insert;

        let mod_buffer = self.buffers.mod_buffer_mut();
        // The scan always emits a leading 0, which the buffer already has.
        mod_buffer
            .line_starts
            .extend(starts.iter().skip(1).map(|s| s + start_offset));
        mod_buffer.bytes.extend_from_slice(txt);

        let end_offset = mod_buffer.bytes.len();
        let end_index = mod_buffer.line_starts.len() - 1;
        let end_pos = BufferCursor {
            line: end_index,
            column: end_offset - mod_buffer.line_starts[end_index],
        };
        let piece = Piece {
            index: BufferIndex::Mod,
            first: start,
            last: end_pos,
            length: end_offset - start_offset,
            newline_count: line_feed_count(&start, &end_pos),
        };
        self.last_insert = end_pos;
        piece
    }

    fn compute_buffer_meta(&mut self) {
        self.meta = BufferMeta {
            lf_count: tree::tree_lf_count(&self.root),
            total_content_length: tree::tree_length(&self.root),
        };
    }

    fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        tree::validate(&self.root);
    }
}

// --- Position resolution and queries, shared with the snapshots. ---

/// Number of line feeds strictly inside `[start, end)` of one buffer. Both
/// cursors sit on the buffer's line grid, so the count is the line distance.
pub(crate) fn line_feed_count(start: &BufferCursor, end: &BufferCursor) -> usize {
    end.line - start.line
}

/// Locate the node containing `off`. Offsets at or past the end land on the
/// rightmost node with `remainder` equal to its piece length; only the empty
/// tree resolves to `None`.
pub(crate) fn node_at(
    buffers: &BufferCollection,
    root: &RedBlackTree,
    mut off: usize,
) -> Option<NodePosition> {
    let mut node = root.clone();
    let mut node_start_offset = 0;
    let mut newline_count = 0;
    while !node.is_empty() {
        let data = *node.root();
        if data.left_subtree_length > off {
            let left = node.left().clone();
            node = left;
        } else if data.left_subtree_length + data.piece.length > off {
            node_start_offset += data.left_subtree_length;
            newline_count += data.left_subtree_lf_count;
            let remainder = off - data.left_subtree_length;
            let pos = buffer_position(buffers, &data.piece, remainder);
            // The cursor line is relative to its buffer; the piece's first
            // line anchors it back to the document.
            newline_count += pos.line - data.piece.first.line;
            return Some(NodePosition {
                piece: data.piece,
                remainder,
                start_offset: node_start_offset,
                line: newline_count + 1,
            });
        } else {
            if node.right().is_empty() {
                node_start_offset += data.left_subtree_length;
                newline_count += data.left_subtree_lf_count + data.piece.newline_count;
                return Some(NodePosition {
                    piece: data.piece,
                    remainder: data.piece.length,
                    start_offset: node_start_offset,
                    line: newline_count + 1,
                });
            }
            let offset_amount = data.left_subtree_length + data.piece.length;
            off -= offset_amount;
            node_start_offset += offset_amount;
            newline_count += data.left_subtree_lf_count + data.piece.newline_count;
            let right = node.right().clone();
            node = right;
        }
    }
    None
}

/// Map an offset within a piece to a cursor in the piece's buffer by binary
/// searching the buffer's line starts over the piece's line span.
pub(crate) fn buffer_position(
    buffers: &BufferCollection,
    piece: &Piece,
    remainder: usize,
) -> BufferCursor {
    let starts = &buffers.buffer_at(piece.index).line_starts;
    let start_offset = starts[piece.first.line] + piece.first.column;
    let offset = start_offset + remainder;

    let mut low = piece.first.line;
    let mut high = piece.last.line;
    loop {
        let mid = low + (high - low) / 2;
        let mid_start = starts[mid];
        // The invariant offset >= starts[low] keeps mid - 1 from underflowing.
        if mid == high || (offset >= mid_start && offset < starts[mid + 1]) {
            return BufferCursor {
                line: mid,
                column: offset - mid_start,
            };
        }
        if offset < mid_start {
            high = mid - 1;
        } else {
            low = mid + 1;
        }
    }
}

/// Shorten `piece` so it ends at `pos`.
pub(crate) fn trim_piece_right(
    buffers: &BufferCollection,
    piece: &Piece,
    pos: BufferCursor,
) -> Piece {
    let orig_end_offset = buffers.buffer_offset(piece.index, piece.last);
    let new_end_offset = buffers.buffer_offset(piece.index, pos);
    Piece {
        last: pos,
        length: piece.length - (orig_end_offset - new_end_offset),
        newline_count: line_feed_count(&piece.first, &pos),
        ..*piece
    }
}

/// Shorten `piece` so it starts at `pos`.
pub(crate) fn trim_piece_left(
    buffers: &BufferCollection,
    piece: &Piece,
    pos: BufferCursor,
) -> Piece {
    let orig_start_offset = buffers.buffer_offset(piece.index, piece.first);
    let new_start_offset = buffers.buffer_offset(piece.index, pos);
    Piece {
        first: pos,
        length: piece.length - (new_start_offset - orig_start_offset),
        newline_count: line_feed_count(&pos, &piece.last),
        ..*piece
    }
}

/// Cut `[first, last)` out of the middle of `piece`, returning the two
/// surviving sides.
fn shrink_piece(
    buffers: &BufferCollection,
    piece: &Piece,
    first: BufferCursor,
    last: BufferCursor,
) -> (Piece, Piece) {
    let left = trim_piece_right(buffers, piece, first);
    let right = trim_piece_left(buffers, piece, last);
    (left, right)
}

/// The byte at `offset` under `root`, or 0 when out of range.
pub(crate) fn char_at(buffers: &BufferCollection, root: &RedBlackTree, offset: usize) -> u8 {
    let Some(result) = node_at(buffers, root, offset) else {
        return 0;
    };
    if result.remainder >= result.piece.length {
        return 0;
    }
    let buffer = buffers.buffer_at(result.piece.index);
    let buf_offset = buffers.buffer_offset(result.piece.index, result.piece.first) + result.remainder;
    buffer.bytes[buf_offset]
}

/// 1-based line containing `offset`. The empty tree reports line 1, the
/// same line `line_count` says it has.
pub(crate) fn line_at(buffers: &BufferCollection, root: &RedBlackTree, offset: usize) -> usize {
    match node_at(buffers, root, offset) {
        Some(result) => result.line,
        None => 1,
    }
}

/// Length of `piece` from its start through the end of its relative line
/// `index`, including that line's terminating line feed.
fn accumulate_value(buffers: &BufferCollection, piece: &Piece, index: usize) -> usize {
    let buffer = buffers.buffer_at(piece.index);
    let starts = &buffer.line_starts;
    let expected_start = piece.first.line + index + 1;
    let first = starts[piece.first.line] + piece.first.column;
    if expected_start > piece.last.line {
        let last = starts[piece.last.line] + piece.last.column;
        return last - first;
    }
    let last = starts[expected_start];
    last - first
}

/// As [`accumulate_value`], but a terminating line feed is excluded so the
/// result addresses the end of the line's content.
fn accumulate_value_no_lf(buffers: &BufferCollection, piece: &Piece, index: usize) -> usize {
    let buffer = buffers.buffer_at(piece.index);
    let starts = &buffer.line_starts;
    let expected_start = piece.first.line + index + 1;
    let first = starts[piece.first.line] + piece.first.column;
    let last = if expected_start > piece.last.line {
        starts[piece.last.line] + piece.last.column
    } else {
        starts[expected_start]
    };
    if last == first {
        return 0;
    }
    if buffer.bytes[last - 1] == b'\n' {
        return last - 1 - first;
    }
    last - first
}

type Accumulator = fn(&BufferCollection, &Piece, usize) -> usize;

/// Walk the tree accumulating the document offset at which `line` starts.
/// The accumulator decides whether a terminating line feed is included.
fn line_start(
    offset: &mut usize,
    buffers: &BufferCollection,
    accumulate: Accumulator,
    node: &RedBlackTree,
    line: usize,
) {
    if node.is_empty() {
        return;
    }
    debug_assert!(line != 0);
    let data = node.root();
    let line_index = line - 1;
    if data.left_subtree_lf_count >= line_index {
        line_start(offset, buffers, accumulate, node.left(), line);
    } else if data.left_subtree_lf_count + data.piece.newline_count >= line_index {
        // The desired line starts inside this piece.
        let line_index = line_index - data.left_subtree_lf_count;
        let mut len = data.left_subtree_length;
        if line_index != 0 {
            len += accumulate(buffers, &data.piece, line_index - 1);
        }
        *offset += len;
    } else {
        let line_index = line_index - data.left_subtree_lf_count - data.piece.newline_count;
        *offset += data.left_subtree_length + data.piece.length;
        line_start(offset, buffers, accumulate, node.right(), line_index + 1);
    }
}

/// Like [`line_start`] with [`accumulate_value_no_lf`], but additionally
/// retracts over a `\r` that forms a `\r\n` pair with the stripped line feed.
fn line_end_crlf(
    offset: &mut usize,
    buffers: &BufferCollection,
    root: &RedBlackTree,
    node: &RedBlackTree,
    line: usize,
) {
    if node.is_empty() {
        return;
    }
    debug_assert!(line != 0);
    let data = node.root();
    let line_index = line - 1;
    if data.left_subtree_lf_count >= line_index {
        line_end_crlf(offset, buffers, root, node.left(), line);
    } else if data.left_subtree_lf_count + data.piece.newline_count >= line_index {
        let line_index = line_index - data.left_subtree_lf_count;
        let mut len = data.left_subtree_length;
        if line_index != 0 {
            len += accumulate_value_no_lf(buffers, &data.piece, line_index - 1);
        }
        if len != 0 {
            let last_char_offset = *offset + len - 1;
            if char_at(buffers, root, last_char_offset) == b'\r'
                && char_at(buffers, root, last_char_offset + 1) == b'\n'
            {
                len -= 1;
            }
        }
        *offset += len;
    } else {
        let line_index = line_index - data.left_subtree_lf_count - data.piece.newline_count;
        *offset += data.left_subtree_length + data.piece.length;
        line_end_crlf(offset, buffers, root, node.right(), line_index + 1);
    }
}

pub(crate) fn line_range(buffers: &BufferCollection, root: &RedBlackTree, line: usize) -> LineRange {
    if line == 0 {
        return LineRange::default();
    }
    let mut first = 0;
    line_start(&mut first, buffers, accumulate_value, root, line);
    let mut last = 0;
    line_start(&mut last, buffers, accumulate_value_no_lf, root, line.saturating_add(1));
    LineRange { first, last }
}

pub(crate) fn line_range_with_newline(
    buffers: &BufferCollection,
    root: &RedBlackTree,
    line: usize,
) -> LineRange {
    if line == 0 {
        return LineRange::default();
    }
    let mut first = 0;
    line_start(&mut first, buffers, accumulate_value, root, line);
    let mut last = 0;
    line_start(&mut last, buffers, accumulate_value, root, line.saturating_add(1));
    LineRange { first, last }
}

pub(crate) fn line_range_crlf(
    buffers: &BufferCollection,
    root: &RedBlackTree,
    line: usize,
) -> LineRange {
    if line == 0 {
        return LineRange::default();
    }
    let mut first = 0;
    line_start(&mut first, buffers, accumulate_value, root, line);
    let mut last = 0;
    line_end_crlf(&mut last, buffers, root, root, line.saturating_add(1));
    LineRange { first, last }
}

pub(crate) fn line_content(
    buf: &mut Vec<u8>,
    buffers: &BufferCollection,
    root: &RedBlackTree,
    meta: BufferMeta,
    line: usize,
) {
    buf.clear();
    if line == 0 {
        return;
    }
    let mut line_offset = 0;
    line_start(&mut line_offset, buffers, accumulate_value, root, line);
    let mut walker = TreeWalker::from_parts(buffers, root.clone(), meta, line_offset);
    while !walker.exhausted() {
        let c = walker.next();
        if c == b'\n' {
            break;
        }
        buf.push(c);
    }
}

pub(crate) fn line_content_crlf(
    buf: &mut Vec<u8>,
    buffers: &BufferCollection,
    root: &RedBlackTree,
    meta: BufferMeta,
    line: usize,
) -> IncompleteCRLF {
    buf.clear();
    if line == 0 || root.is_empty() {
        return IncompleteCRLF::No;
    }
    let mut line_offset = 0;
    line_start(&mut line_offset, buffers, accumulate_value, root, line);
    let mut walker = TreeWalker::from_parts(buffers, root.clone(), meta, line_offset);
    let mut prev = 0u8;
    while !walker.exhausted() {
        let c = walker.next();
        if c == b'\n' {
            if prev == b'\r' {
                buf.pop();
                return IncompleteCRLF::No;
            }
            return IncompleteCRLF::Yes;
        }
        buf.push(c);
        prev = c;
    }
    IncompleteCRLF::No
}
