//! Persistent red-black tree of pieces.
//!
//! Every node is immutable and shared behind an [`Arc`]; insert and remove
//! build a new root that aliases the untouched subtrees of the old one, so a
//! root captured before an edit remains a valid document forever. Ordering is
//! by accumulated byte offset, and every node caches the total length and
//! line-feed count of its left subtree, which makes offset and line queries
//! O(log n) in the number of pieces.
//!
//! Insertion uses the classic four-case functional rebalance against a black
//! grandparent; deletion uses the fuse/balance-left/balance-right scheme for
//! persistent trees. Both re-attribute the left-subtree aggregates in the
//! node constructor, so no separate fix-up pass is needed.

use std::sync::Arc;

use crate::types::{BufferCursor, BufferIndex};

/// An immutable descriptor of a contiguous byte range inside one buffer.
///
/// The range is `[first, last)` in the buffer's line/column coordinates.
/// `length` is the byte distance between the two cursors and `newline_count`
/// the number of line feeds strictly inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Piece {
    pub index: BufferIndex,
    pub first: BufferCursor,
    pub last: BufferCursor,
    pub length: usize,
    pub newline_count: usize,
}

/// Node payload: a piece plus the cached aggregates of the left subtree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeData {
    pub piece: Piece,
    pub left_subtree_length: usize,
    pub left_subtree_lf_count: usize,
}

impl NodeData {
    /// Wrap a piece; the aggregates are attributed when the node is built.
    pub fn new(piece: Piece) -> Self {
        Self {
            piece,
            left_subtree_length: 0,
            left_subtree_lf_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node {
    color: Color,
    left: RedBlackTree,
    data: NodeData,
    right: RedBlackTree,
}

/// A possibly-empty persistent red-black tree root.
///
/// Cloning is O(1) and shares every node. A value obtained from
/// [`TextBuffer::head`](crate::TextBuffer::head) can be stored and later
/// passed to [`TextBuffer::snap_to`](crate::TextBuffer::snap_to) to navigate
/// between revisions.
#[derive(Debug, Clone, Default)]
pub struct RedBlackTree {
    root_node: Option<Arc<Node>>,
}

impl PartialEq for RedBlackTree {
    /// Two roots are equal when they are the same shared node (or both empty).
    fn eq(&self, other: &Self) -> bool {
        match (&self.root_node, &other.root_node) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for RedBlackTree {}

impl RedBlackTree {
    /// The empty tree.
    pub fn new() -> Self {
        Self { root_node: None }
    }

    /// Whether this root holds no pieces.
    pub fn is_empty(&self) -> bool {
        self.root_node.is_none()
    }

    fn node_ref(&self) -> &Node {
        self.root_node
            .as_deref()
            .expect("operation on empty subtree")
    }

    pub(crate) fn root(&self) -> &NodeData {
        &self.node_ref().data
    }

    pub(crate) fn left(&self) -> &RedBlackTree {
        &self.node_ref().left
    }

    pub(crate) fn right(&self) -> &RedBlackTree {
        &self.node_ref().right
    }

    fn root_color(&self) -> Color {
        self.node_ref().color
    }

    /// Build a node over the given children, re-attributing the left-subtree
    /// aggregates from `left`.
    fn node(color: Color, left: &RedBlackTree, data: &NodeData, right: &RedBlackTree) -> Self {
        Self {
            root_node: Some(Arc::new(Node {
                color,
                left: left.clone(),
                data: attribute(data, left),
                right: right.clone(),
            })),
        }
    }

    fn paint(&self, color: Color) -> Self {
        Self::node(color, self.left(), self.root(), self.right())
    }

    /// Insert `data` so that its piece starts at document offset `at`,
    /// returning the new root.
    pub(crate) fn insert(&self, data: NodeData, at: usize) -> Self {
        let t = self.ins(&data, at, 0);
        Self::node(Color::Black, t.left(), t.root(), t.right())
    }

    fn ins(&self, x: &NodeData, at: usize, total_offset: usize) -> Self {
        let Some(node) = &self.root_node else {
            return Self::node(Color::Red, &Self::new(), x, &Self::new());
        };
        let y = &node.data;
        if at < total_offset + y.left_subtree_length + y.piece.length {
            Self::balance_ins(node.color, &self.left().ins(x, at, total_offset), y, self.right())
        } else {
            let advanced = total_offset + y.left_subtree_length + y.piece.length;
            Self::balance_ins(node.color, self.left(), y, &self.right().ins(x, at, advanced))
        }
    }

    /// Okasaki's four balance cases: a black node with a red child that has a
    /// red child of its own is rotated so the middle value becomes a red root
    /// over two black children.
    fn balance_ins(c: Color, lft: &Self, x: &NodeData, rgt: &Self) -> Self {
        if c == Color::Black && lft.doubled_left() {
            Self::node(
                Color::Red,
                &lft.left().paint(Color::Black),
                lft.root(),
                &Self::node(Color::Black, lft.right(), x, rgt),
            )
        } else if c == Color::Black && lft.doubled_right() {
            Self::node(
                Color::Red,
                &Self::node(Color::Black, lft.left(), lft.root(), lft.right().left()),
                lft.right().root(),
                &Self::node(Color::Black, lft.right().right(), x, rgt),
            )
        } else if c == Color::Black && rgt.doubled_left() {
            Self::node(
                Color::Red,
                &Self::node(Color::Black, lft, x, rgt.left().left()),
                rgt.left().root(),
                &Self::node(Color::Black, rgt.left().right(), rgt.root(), rgt.right()),
            )
        } else if c == Color::Black && rgt.doubled_right() {
            Self::node(
                Color::Red,
                &Self::node(Color::Black, lft, x, rgt.left()),
                rgt.root(),
                &rgt.right().paint(Color::Black),
            )
        } else {
            Self::node(c, lft, x, rgt)
        }
    }

    fn doubled_left(&self) -> bool {
        !self.is_empty()
            && self.root_color() == Color::Red
            && !self.left().is_empty()
            && self.left().root_color() == Color::Red
    }

    fn doubled_right(&self) -> bool {
        !self.is_empty()
            && self.root_color() == Color::Red
            && !self.right().is_empty()
            && self.right().root_color() == Color::Red
    }

    /// Remove the node whose piece starts at document offset `at`, returning
    /// the new root.
    pub(crate) fn remove(&self, at: usize) -> Self {
        let t = Self::rem(self, at, 0);
        if t.is_empty() {
            return Self::new();
        }
        Self::node(Color::Black, t.left(), t.root(), t.right())
    }

    /// Join two subtrees of equal black height into one.
    fn fuse(left: &Self, right: &Self) -> Self {
        if left.is_empty() {
            return right.clone();
        }
        if right.is_empty() {
            return left.clone();
        }
        // (B, R): push the fuse into the red right side.
        if left.root_color() == Color::Black && right.root_color() == Color::Red {
            return Self::node(
                Color::Red,
                &Self::fuse(left, right.left()),
                right.root(),
                right.right(),
            );
        }
        // (R, B): mirror.
        if left.root_color() == Color::Red && right.root_color() == Color::Black {
            return Self::node(
                Color::Red,
                left.left(),
                left.root(),
                &Self::fuse(left.right(), right),
            );
        }
        // (R, R): fuse the inner grandchildren; a red result is split between
        // the two parents.
        if left.root_color() == Color::Red && right.root_color() == Color::Red {
            let fused = Self::fuse(left.right(), right.left());
            if !fused.is_empty() && fused.root_color() == Color::Red {
                let new_left = Self::node(Color::Red, left.left(), left.root(), fused.left());
                let new_right = Self::node(Color::Red, fused.right(), right.root(), right.right());
                return Self::node(Color::Red, &new_left, fused.root(), &new_right);
            }
            let new_right = Self::node(Color::Red, &fused, right.root(), right.right());
            return Self::node(Color::Red, left.left(), left.root(), &new_right);
        }
        // (B, B): fuse the inner grandchildren; a black spine under a red
        // node needs a balance_left to restore the invariants.
        debug_assert!(left.root_color() == Color::Black && right.root_color() == Color::Black);
        let fused = Self::fuse(left.right(), right.left());
        if !fused.is_empty() && fused.root_color() == Color::Red {
            let new_left = Self::node(Color::Black, left.left(), left.root(), fused.left());
            let new_right = Self::node(Color::Black, fused.right(), right.root(), right.right());
            return Self::node(Color::Red, &new_left, fused.root(), &new_right);
        }
        let new_right = Self::node(Color::Black, &fused, right.root(), right.right());
        let new_node = Self::node(Color::Red, left.left(), left.root(), &new_right);
        Self::balance_left(&new_node)
    }

    /// Repair a red node that may carry two red children or a red-red chain.
    fn balance(node: &Self) -> Self {
        if !node.left().is_empty()
            && node.left().root_color() == Color::Red
            && !node.right().is_empty()
            && node.right().root_color() == Color::Red
        {
            let l = node.left().paint(Color::Black);
            let r = node.right().paint(Color::Black);
            return Self::node(Color::Red, &l, node.root(), &r);
        }
        debug_assert!(node.root_color() == Color::Black);
        Self::balance_ins(node.root_color(), node.left(), node.root(), node.right())
    }

    /// The left subtree of `left` lost one black node; restore the black
    /// height. Cases keyed on the colors of the sibling and near nephew.
    fn balance_left(left: &Self) -> Self {
        // (Some(R), ..): repaint covers the deficit.
        if !left.left().is_empty() && left.left().root_color() == Color::Red {
            return Self::node(
                Color::Red,
                &left.left().paint(Color::Black),
                left.root(),
                left.right(),
            );
        }
        // (_, Some(B), _): borrow from the black sibling.
        if !left.right().is_empty() && left.right().root_color() == Color::Black {
            let new_left = Self::node(
                Color::Black,
                left.left(),
                left.root(),
                &left.right().paint(Color::Red),
            );
            return Self::balance(&new_left);
        }
        // (_, Some(R), Some(B)): rotate the near nephew up, then repair the
        // red-red violation the rotation may introduce.
        if !left.right().is_empty()
            && left.right().root_color() == Color::Red
            && !left.right().left().is_empty()
            && left.right().left().root_color() == Color::Black
        {
            let unbalanced_new_right = Self::node(
                Color::Black,
                left.right().left().right(),
                left.right().root(),
                &left.right().right().paint(Color::Red),
            );
            let new_right = Self::balance(&unbalanced_new_right);
            let new_left = Self::node(
                Color::Black,
                left.left(),
                left.root(),
                left.right().left().left(),
            );
            return Self::node(Color::Red, &new_left, left.right().left().root(), &new_right);
        }
        debug_assert!(false, "balance_left: no case applied");
        left.clone()
    }

    /// Mirror of [`balance_left`] for a right subtree that lost a black node.
    fn balance_right(right: &Self) -> Self {
        // (.., Some(R))
        if !right.right().is_empty() && right.right().root_color() == Color::Red {
            return Self::node(
                Color::Red,
                right.left(),
                right.root(),
                &right.right().paint(Color::Black),
            );
        }
        // (Some(B), ..)
        if !right.left().is_empty() && right.left().root_color() == Color::Black {
            let new_right = Self::node(
                Color::Black,
                &right.left().paint(Color::Red),
                right.root(),
                right.right(),
            );
            return Self::balance(&new_right);
        }
        // (Some(R), Some(B), _)
        if !right.left().is_empty()
            && right.left().root_color() == Color::Red
            && !right.left().right().is_empty()
            && right.left().right().root_color() == Color::Black
        {
            let unbalanced_new_left = Self::node(
                Color::Black,
                // A red left child always has children of its own here.
                &right.left().left().paint(Color::Red),
                right.left().root(),
                right.left().right().left(),
            );
            let new_left = Self::balance(&unbalanced_new_left);
            let new_right = Self::node(
                Color::Black,
                right.left().right().right(),
                right.root(),
                right.right(),
            );
            return Self::node(Color::Red, &new_left, right.left().right().root(), &new_right);
        }
        debug_assert!(false, "balance_right: no case applied");
        right.clone()
    }

    fn remove_left(root: &Self, at: usize, total: usize) -> Self {
        let new_left = Self::rem(root.left(), at, total);
        let new_node = Self::node(Color::Red, &new_left, root.root(), root.right());
        // Only a removal under a black child can shrink the black height.
        if !root.left().is_empty() && root.left().root_color() == Color::Black {
            return Self::balance_left(&new_node);
        }
        new_node
    }

    fn remove_right(root: &Self, at: usize, total: usize) -> Self {
        let y = root.root();
        let advanced = total + y.left_subtree_length + y.piece.length;
        let new_right = Self::rem(root.right(), at, advanced);
        let new_node = Self::node(Color::Red, root.left(), root.root(), &new_right);
        if !root.right().is_empty() && root.right().root_color() == Color::Black {
            return Self::balance_right(&new_node);
        }
        new_node
    }

    fn rem(root: &Self, at: usize, total: usize) -> Self {
        let Some(node) = &root.root_node else {
            return Self::new();
        };
        let y = &node.data;
        if at < total + y.left_subtree_length {
            return Self::remove_left(root, at, total);
        }
        if at == total + y.left_subtree_length {
            return Self::fuse(root.left(), root.right());
        }
        Self::remove_right(root, at, total)
    }
}

/// Total byte length of the pieces under `root`. Only the right spine is
/// walked; the left side comes from the cached aggregates.
pub(crate) fn tree_length(root: &RedBlackTree) -> usize {
    let mut total = 0;
    let mut t = root;
    while !t.is_empty() {
        let data = t.root();
        total += data.left_subtree_length + data.piece.length;
        t = t.right();
    }
    total
}

/// Total line-feed count of the pieces under `root`.
pub(crate) fn tree_lf_count(root: &RedBlackTree) -> usize {
    let mut total = 0;
    let mut t = root;
    while !t.is_empty() {
        let data = t.root();
        total += data.left_subtree_lf_count + data.piece.newline_count;
        t = t.right();
    }
    total
}

/// Recompute `data` with the aggregates of `left`.
fn attribute(data: &NodeData, left: &RedBlackTree) -> NodeData {
    NodeData {
        piece: data.piece,
        left_subtree_length: tree_length(left),
        left_subtree_lf_count: tree_lf_count(left),
    }
}

/// Structural self-check: red-black coloring, equal black heights, and
/// aggregate consistency. A violation here is a bug in the tree algorithms,
/// so it asserts rather than reporting an error.
#[cfg(any(test, debug_assertions))]
pub(crate) fn validate(root: &RedBlackTree) {
    if root.is_empty() {
        return;
    }
    assert!(
        root.root_color() == Color::Black,
        "root must be black"
    );
    check_subtree(root);
}

/// Returns (black height, total length, total LF count) of the subtree.
#[cfg(any(test, debug_assertions))]
fn check_subtree(t: &RedBlackTree) -> (usize, usize, usize) {
    if t.is_empty() {
        return (1, 0, 0);
    }
    if t.root_color() == Color::Red {
        assert!(
            t.left().is_empty() || t.left().root_color() == Color::Black,
            "red node with red left child"
        );
        assert!(
            t.right().is_empty() || t.right().root_color() == Color::Black,
            "red node with red right child"
        );
    }
    let (lh, llen, llf) = check_subtree(t.left());
    let (rh, rlen, rlf) = check_subtree(t.right());
    assert_eq!(lh, rh, "unequal black height");
    let data = t.root();
    assert_eq!(data.left_subtree_length, llen, "stale left length aggregate");
    assert_eq!(data.left_subtree_lf_count, llf, "stale left LF aggregate");
    let height = lh + usize::from(t.root_color() == Color::Black);
    (
        height,
        llen + data.piece.length + rlen,
        llf + data.piece.newline_count + rlf,
    )
}
