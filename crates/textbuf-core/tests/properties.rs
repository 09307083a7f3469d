//! Property tests driving the tree and a naive byte-vector model with the
//! same operation sequences.

use proptest::prelude::*;
use textbuf_core::TextBuffer;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize, Vec<u8>),
    Remove(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let byte = prop_oneof![
        Just(b'a'),
        Just(b'z'),
        Just(b'0'),
        Just(b' '),
        Just(b'\n'),
        Just(b'\r'),
    ];
    prop_oneof![
        (any::<usize>(), proptest::collection::vec(byte, 1..9))
            .prop_map(|(offset, text)| Op::Insert(offset, text)),
        (any::<usize>(), 1usize..12).prop_map(|(offset, count)| Op::Remove(offset, count)),
    ]
}

/// Apply `op` to both the tree and the model, keeping offsets in range the
/// same way for both.
fn apply(tree: &mut TextBuffer, model: &mut Vec<u8>, op: &Op) {
    match op {
        Op::Insert(offset, text) => {
            let offset = offset % (model.len() + 1);
            tree.insert(offset, text);
            model.splice(offset..offset, text.iter().copied());
        }
        Op::Remove(offset, count) => {
            if model.is_empty() {
                tree.remove(0, *count);
                return;
            }
            let offset = offset % model.len();
            let count = (*count).min(model.len() - offset);
            tree.remove(offset, count);
            model.drain(offset..offset + count);
        }
    }
}

proptest! {
    #[test]
    fn prop_streamed_output_matches_model(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut tree = TextBuffer::from_bytes(b"initial\ncontent");
        let mut model: Vec<u8> = b"initial\ncontent".to_vec();
        for op in &ops {
            apply(&mut tree, &mut model, op);
        }

        let streamed: Vec<u8> = tree.walker().collect();
        prop_assert_eq!(&streamed, &model);
        prop_assert_eq!(tree.length(), model.len());

        // LF bookkeeping matches the bytes actually stored.
        let lf_count = model.iter().filter(|&&b| b == b'\n').count();
        prop_assert_eq!(tree.line_feed_count(), lf_count);
        prop_assert_eq!(tree.line_count(), lf_count + 1);
    }

    #[test]
    fn prop_forward_reverse_symmetry(ops in proptest::collection::vec(op_strategy(), 0..30)) {
        let mut tree = TextBuffer::from_bytes(b"seed");
        let mut model: Vec<u8> = b"seed".to_vec();
        for op in &ops {
            apply(&mut tree, &mut model, op);
        }

        let forward: Vec<u8> = tree.walker().collect();
        let mut backward: Vec<u8> = tree.reverse_walker().collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_round_trip_single_insert(text in proptest::collection::vec(any::<u8>(), 0..200)) {
        let mut tree = TextBuffer::new();
        tree.insert(0, &text);
        let streamed: Vec<u8> = tree.walker().collect();
        prop_assert_eq!(streamed, text);
    }

    #[test]
    fn prop_at_matches_walker_seek(
        ops in proptest::collection::vec(op_strategy(), 1..25),
        probes in proptest::collection::vec(any::<usize>(), 1..10),
    ) {
        let mut tree = TextBuffer::from_bytes(b"probe target");
        let mut model: Vec<u8> = b"probe target".to_vec();
        for op in &ops {
            apply(&mut tree, &mut model, op);
        }
        prop_assume!(!model.is_empty());

        let mut walker = tree.walker();
        let mut reverse = tree.reverse_walker();
        for probe in &probes {
            let offset = probe % model.len();
            prop_assert_eq!(tree.at(offset), model[offset]);
            walker.seek(offset);
            prop_assert_eq!(walker.next(), model[offset]);
            reverse.seek(offset);
            prop_assert_eq!(reverse.next(), model[offset]);
        }
    }

    #[test]
    fn prop_line_ranges_partition_the_document(ops in proptest::collection::vec(op_strategy(), 0..30)) {
        let mut tree = TextBuffer::from_bytes(b"a\nb");
        let mut model: Vec<u8> = b"a\nb".to_vec();
        for op in &ops {
            apply(&mut tree, &mut model, op);
        }

        let mut covered = 0;
        let mut buf = Vec::new();
        for line in 1..=tree.line_count() {
            let range = tree.get_line_range(line);
            let with_newline = tree.get_line_range_with_newline(line);
            prop_assert!(range.last >= range.first, "line {} inverted", line);
            prop_assert_eq!(range.first, covered, "line {} must continue the partition", line);
            prop_assert!(with_newline.last >= range.last);
            covered = with_newline.last;

            tree.get_line_content(line, &mut buf);
            prop_assert_eq!(buf.len(), range.last - range.first);
            prop_assert_ne!(buf.last().copied(), Some(b'\n'));
            prop_assert_eq!(&buf[..], &model[range.first..range.last]);
        }
        prop_assert_eq!(covered, tree.length());
    }

    #[test]
    fn prop_undo_redo_are_inverse(
        ops in proptest::collection::vec(op_strategy(), 1..25),
        extra in op_strategy(),
    ) {
        let mut tree = TextBuffer::from_bytes(b"base");
        let mut model: Vec<u8> = b"base".to_vec();
        for op in &ops {
            apply(&mut tree, &mut model, op);
        }

        let before: Vec<u8> = tree.walker().collect();
        let undone = tree.try_undo(0);
        if undone.success {
            let redone = tree.try_redo(0);
            prop_assert!(redone.success);
            let after: Vec<u8> = tree.walker().collect();
            prop_assert_eq!(&before, &after);

            // A fresh edit after an undo must invalidate redo.
            let r = tree.try_undo(0);
            if r.success {
                apply(&mut tree, &mut model, &extra);
                prop_assert!(!tree.try_redo(0).success);
            }
        }
    }

    #[test]
    fn prop_snapshots_are_immutable(
        ops in proptest::collection::vec(op_strategy(), 1..20),
        later in proptest::collection::vec(op_strategy(), 1..20),
    ) {
        let mut tree = TextBuffer::from_bytes(b"snapshot base\n");
        let mut model: Vec<u8> = b"snapshot base\n".to_vec();
        for op in &ops {
            apply(&mut tree, &mut model, op);
        }

        let snap = tree.owning_snap();
        let frozen = model.clone();
        for op in &later {
            apply(&mut tree, &mut model, op);
        }

        let streamed: Vec<u8> = snap.walker().collect();
        prop_assert_eq!(streamed, frozen);
    }
}
