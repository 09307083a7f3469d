use textbuf_core::{SuppressHistory, TextBuffer};

fn text(tree: &TextBuffer) -> String {
    String::from_utf8_lossy(&tree.walker().collect::<Vec<u8>>()).into_owned()
}

fn main() {
    let mut tree = TextBuffer::from_bytes(b"Hello, World!");

    // Typing coalesces into a single undo entry.
    tree.insert(0, b"a");
    tree.insert(1, b"b");
    tree.insert(2, b"c");
    assert_eq!(text(&tree), "abcHello, World!");

    let r = tree.try_undo(0);
    assert!(r.success);
    assert_eq!(text(&tree), "Hello, World!");
    println!("undo restored: {}", text(&tree));

    // Roots are persistent, so any of them can be kept and revisited.
    let base = tree.head();

    tree.insert_with(13, b" (branch A)", SuppressHistory::Yes);
    let branch_a = tree.head();

    tree.snap_to(base.clone());
    tree.insert_with(13, b" (branch B)", SuppressHistory::Yes);
    let branch_b = tree.head();

    tree.snap_to(branch_a);
    println!("branch A: {}", text(&tree));
    assert_eq!(text(&tree), "Hello, World! (branch A)");

    tree.snap_to(branch_b);
    println!("branch B: {}", text(&tree));
    assert_eq!(text(&tree), "Hello, World! (branch B)");

    tree.snap_to(base);
    assert_eq!(text(&tree), "Hello, World!");
    println!("back on base: {}", text(&tree));
}
