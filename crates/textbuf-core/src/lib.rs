#![warn(missing_docs)]
//! textbuf-core - Persistent Piece-Tree Text Buffer
//!
//! # Overview
//!
//! `textbuf-core` is a text-buffer kernel for interactive editors. It stores
//! a document as a tree of pieces referencing two classes of byte storage
//! (immutable original buffers and one append-only modification buffer) and
//! supports fast insertion and deletion at arbitrary positions, line-oriented
//! retrieval, forward and reverse streaming, and a history of past revisions.
//!
//! The balanced tree is a fully persistent red-black tree: every edit builds
//! a new root that structurally shares the unchanged majority of the previous
//! one. Saving the old root is therefore all it takes to support undo, and
//! redo is the same trick in the other direction.
//!
//! # Core Features
//!
//! - **O(log n) edits** in the number of pieces, at any position
//! - **O(1) undo/redo** by swapping persistent roots
//! - **Line-oriented queries** backed by line-feed aggregates in every node
//! - **Snapshots** that stay coherent while the parent keeps editing
//! - **Forward and reverse walkers** with fast-forward seek
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  TextBuffer (edits, queries, history)       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Snapshots & Walkers                        │  ← Read surface
//! ├─────────────────────────────────────────────┤
//! │  Persistent red-black tree of pieces        │  ← Index
//! ├─────────────────────────────────────────────┤
//! │  Byte buffers + line-start indexes          │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use textbuf_core::{TextBuffer, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new();
//! builder.accept(b"fn main() {\n");
//! builder.accept(b"}\n");
//! let mut tree = builder.create();
//!
//! tree.insert(12, b"    println!(\"hi\");\n");
//! assert_eq!(tree.line_count(), 4);
//!
//! let mut line = Vec::new();
//! tree.get_line_content(2, &mut line);
//! assert_eq!(line, b"    println!(\"hi\");");
//!
//! let r = tree.try_undo(0);
//! assert!(r.success);
//! assert_eq!(tree.line_count(), 3);
//! ```
//!
//! # Offsets and Lines
//!
//! Offsets are 0-based byte positions. Lines are 1-based; line 0 is reserved
//! to mean "before the document" and always yields an empty result. The
//! buffer operates on 8-bit units: `\n` terminates lines, and `\r` is an
//! ordinary content byte that only the `*_crlf` query variants strip.

mod buffer;
mod history;
mod snapshot;
mod text_buffer;
mod tree;
mod types;
mod walker;

pub use snapshot::{OwningSnapshot, ReferenceSnapshot};
pub use text_buffer::{TextBuffer, TreeBuilder};
pub use tree::RedBlackTree;
pub use types::{IncompleteCRLF, LineRange, SuppressHistory, UndoRedoResult};
pub use walker::{ReverseTreeWalker, TreeWalker};
