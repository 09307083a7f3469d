use textbuf_core::{SuppressHistory, TextBuffer};

fn contents(tree: &TextBuffer) -> Vec<u8> {
    tree.walker().collect()
}

#[test]
fn test_undo_redo_walks_both_directions() {
    let mut tree = TextBuffer::from_bytes(b"Hello, World!");

    // Three single-character inserts that continue each other coalesce into
    // one undo entry.
    tree.insert(0, b"a");
    tree.insert(1, b"b");
    tree.insert(2, b"c");
    assert_eq!(contents(&tree), b"abcHello, World!");

    tree.remove(0, 3);
    assert_eq!(contents(&tree), b"Hello, World!");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"abcHello, World!");

    let r = tree.try_redo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"Hello, World!");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"abcHello, World!");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"Hello, World!");

    // History is exhausted; state must not change.
    let r = tree.try_undo(0);
    assert!(!r.success);
    assert_eq!(contents(&tree), b"Hello, World!");

    let r = tree.try_redo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"abcHello, World!");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"Hello, World!");
}

#[test]
fn test_fresh_edit_invalidates_redo() {
    let mut tree = TextBuffer::from_bytes(b"Hello, World!");
    tree.insert(0, b"abc");
    tree.try_undo(0);
    assert_eq!(contents(&tree), b"Hello, World!");
    assert!(tree.can_redo());

    tree.insert(0, b"NEW");
    assert_eq!(contents(&tree), b"NEWHello, World!");

    let r = tree.try_redo(0);
    assert!(!r.success);

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"Hello, World!");
}

#[test]
fn test_op_offset_round_trips_through_history() {
    let mut tree = TextBuffer::from_bytes(b"0123456789");
    tree.insert(4, b"ins");
    tree.remove(0, 2);

    // Undo reports the offset recorded with the state being restored; the
    // caller's offset is what a later redo reports back.
    let r = tree.try_undo(77);
    assert!(r.success);
    assert_eq!(r.op_offset, 0);

    let r = tree.try_redo(0);
    assert!(r.success);
    assert_eq!(r.op_offset, 77);

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(r.op_offset, 0);

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(r.op_offset, 4);
}

#[test]
fn test_distinct_inserts_do_not_coalesce() {
    let mut tree = TextBuffer::new();
    tree.insert(0, b"a");
    tree.insert(1, b"b"); // continues the previous insert: coalesces
    tree.insert(0, b"!"); // jumps back: a fresh undo entry
    assert_eq!(contents(&tree), b"!ab");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"ab");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"");

    assert!(!tree.try_undo(0).success);
}

#[test]
fn test_suppressed_edits_leave_no_history() {
    let mut tree = TextBuffer::from_bytes(b"Hello, World!");

    tree.insert_with(0, b"a", SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"aHello, World!");
    assert!(!tree.try_undo(0).success);

    tree.remove_with(0, 1, SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"Hello, World!");
    assert!(!tree.try_undo(0).success);

    // An explicit commit makes the current state the undo point for a
    // whole batch of suppressed edits.
    tree.commit_head(0);
    tree.insert_with(0, b"a", SuppressHistory::Yes);
    tree.insert_with(1, b"b", SuppressHistory::Yes);
    tree.insert_with(2, b"c", SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"abcHello, World!");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"Hello, World!");

    tree.commit_head(0);
    tree.remove_with(0, 7, SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"World!");
    tree.remove_with(5, 1, SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"World");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"Hello, World!");

    let r = tree.try_redo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"World");
}

#[test]
fn test_branch_navigation_with_head_and_snap_to() {
    let mut tree = TextBuffer::from_bytes(b"Hello, World!");
    let initial_commit = tree.head();

    tree.insert_with(0, b"a", SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"aHello, World!");
    assert!(!tree.try_undo(0).success);

    let commit = tree.head();
    tree.snap_to(initial_commit.clone());
    assert_eq!(contents(&tree), b"Hello, World!");

    tree.snap_to(commit.clone());
    assert_eq!(contents(&tree), b"aHello, World!");

    tree.remove_with(0, 8, SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"World!");

    tree.snap_to(commit.clone());
    assert_eq!(contents(&tree), b"aHello, World!");

    tree.snap_to(initial_commit);
    assert_eq!(contents(&tree), b"Hello, World!");

    // Grow a new branch, leave it, and come back.
    tree.insert_with(13, b" More text.", SuppressHistory::Yes);
    assert_eq!(contents(&tree), b"Hello, World! More text.");
    let branch = tree.head();

    tree.snap_to(commit);
    assert_eq!(contents(&tree), b"aHello, World!");

    tree.snap_to(branch);
    assert_eq!(contents(&tree), b"Hello, World! More text.");
    assert_eq!(tree.length(), 24);
}

#[test]
fn test_snap_to_recomputes_line_metadata() {
    let mut tree = TextBuffer::from_bytes(b"one\ntwo");
    let flat = tree.head();
    tree.insert_with(3, b"\nand\n", SuppressHistory::Yes);
    assert_eq!(tree.line_count(), 4);

    tree.snap_to(flat);
    assert_eq!(tree.line_count(), 2);
    assert_eq!(tree.length(), 7);
}

#[test]
fn test_undo_of_multi_piece_removal() {
    let mut tree = TextBuffer::new();
    let chunks: [&[u8]; 4] = [b"alpha\n", b"beta\n", b"gamma\n", b"delta\n"];
    for chunk in chunks {
        let at = tree.length();
        tree.commit_head(0);
        tree.insert_with(at, chunk, SuppressHistory::Yes);
    }
    assert_eq!(contents(&tree), b"alpha\nbeta\ngamma\ndelta\n");

    // Cut across all four pieces at once.
    tree.remove(2, 18);
    assert_eq!(contents(&tree), b"alta\n");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(contents(&tree), b"alpha\nbeta\ngamma\ndelta\n");
    assert_eq!(tree.line_count(), 5);
}
