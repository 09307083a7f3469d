use textbuf_core::{TextBuffer, TreeBuilder};

/// Assert the document content through every read path: forward walk,
/// both snapshot flavors, and the reverse walk.
fn assert_buffer(tree: &TextBuffer, expected: &[u8]) {
    let forward: Vec<u8> = tree.walker().collect();
    assert_eq!(forward, expected, "forward walk mismatch");

    let owning: Vec<u8> = tree.owning_snap().walker().collect();
    assert_eq!(owning, expected, "owning snapshot mismatch");

    let reference: Vec<u8> = tree.ref_snap().walker().collect();
    assert_eq!(reference, expected, "reference snapshot mismatch");

    let mut reversed: Vec<u8> = tree.reverse_walker().collect();
    reversed.reverse();
    assert_eq!(reversed, expected, "reverse walk mismatch");

    assert_eq!(tree.length(), expected.len());
}

#[test]
fn test_remove_joins_lines() {
    let mut builder = TreeBuilder::new();
    builder.accept(b"A\nB\nC\nD");
    let mut tree = builder.create();
    assert_buffer(&tree, b"A\nB\nC\nD");

    tree.remove(4, 1);
    tree.remove(3, 1);

    assert_buffer(&tree, b"A\nB\nD");
    assert_eq!(tree.line_count(), 3);
}

#[test]
fn test_append_then_remove_across_the_join() {
    let mut builder = TreeBuilder::new();
    builder.accept(b"ABCD");
    let mut tree = builder.create();

    tree.insert(4, b"a");
    assert_buffer(&tree, b"ABCDa");

    tree.remove(3, 2);
    assert_buffer(&tree, b"ABC");
}

#[test]
fn test_empty_original_buffer() {
    let mut builder = TreeBuilder::new();
    builder.accept(b"");
    let mut tree = builder.create();
    assert_buffer(&tree, b"");

    tree.insert(0, b"a");
    assert_buffer(&tree, b"a");

    tree.remove(0, 1);
    assert_buffer(&tree, b"");
    assert!(tree.is_empty());
}

#[test]
fn test_multi_buffer_edit_and_line_content() {
    let mut builder = TreeBuilder::new();
    builder.accept(b"ABC");
    builder.accept(b"DEF");
    let mut tree = builder.create();

    tree.insert(0, b"foo");
    assert_buffer(&tree, b"fooABCDEF");

    tree.remove(6, 3);
    assert_buffer(&tree, b"fooABC");

    let mut buf = Vec::new();
    tree.get_line_content(1, &mut buf);
    assert_eq!(buf, b"fooABC");
}

#[test]
fn test_scattered_single_char_edit_storm() {
    let builder = TreeBuilder::new();
    let mut tree = builder.create();

    // Append four lines of "asdf", one keystroke at a time.
    for _ in 0..4 {
        for &c in b"asdf\n" {
            tree.insert(tree.length(), &[c]);
        }
    }
    assert_buffer(&tree, b"asdf\nasdf\nasdf\nasdf\n");

    // Scatter twenty more keystrokes through the document.
    let scattered: &[(usize, u8)] = &[
        (1, b'a'),
        (2, b's'),
        (3, b'd'),
        (4, b'f'),
        (5, b'\n'),
        (6, b'a'),
        (12, b's'),
        (15, b'd'),
        (17, b'f'),
        (18, b'\n'),
        (2, b'a'),
        (21, b's'),
        (21, b'd'),
        (23, b'f'),
        (29, b'\n'),
        (30, b'a'),
        (0, b's'),
        (1, b'd'),
        (10, b'f'),
        (11, b'\n'),
    ];
    for &(offset, c) in scattered {
        tree.insert(offset, &[c]);
    }
    assert_eq!(tree.length(), 40);

    // Then hold delete at offset 5 for fifteen keystrokes.
    for _ in 0..15 {
        tree.remove(5, 1);
    }

    assert_buffer(&tree, b"sdaaadff\n\ndsfasdf\n\naasdf\n");
    assert_eq!(tree.line_feed_count(), 6);
}

#[test]
fn test_edit_storm_matches_naive_model() {
    // Drive the tree and a plain Vec<u8> with the same pseudo-random edits
    // and require identical documents throughout.
    let mut tree = TextBuffer::from_bytes(b"seed\ncontent\nhere");
    let mut model: Vec<u8> = b"seed\ncontent\nhere".to_vec();

    let mut state = 0x2545f491u64;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for round in 0..500 {
        let len = model.len();
        if round % 3 == 0 && len > 4 {
            let offset = (next() as usize) % len;
            let count = 1 + (next() as usize) % 4;
            let count = count.min(len - offset);
            tree.remove(offset, count);
            model.drain(offset..offset + count);
        } else {
            let offset = (next() as usize) % (len + 1);
            let text = match round % 4 {
                0 => b"x".as_slice(),
                1 => b"yz".as_slice(),
                2 => b"\n".as_slice(),
                _ => b"ab\ncd".as_slice(),
            };
            tree.insert(offset, text);
            model.splice(offset..offset, text.iter().copied());
        }

        assert_eq!(tree.length(), model.len(), "length diverged at round {round}");
    }

    let streamed: Vec<u8> = tree.walker().collect();
    assert_eq!(streamed, model);
    assert_eq!(
        tree.line_feed_count(),
        model.iter().filter(|&&b| b == b'\n').count()
    );
}
