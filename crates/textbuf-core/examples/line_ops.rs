use textbuf_core::{TextBuffer, TreeBuilder};

fn line(tree: &TextBuffer, n: usize) -> String {
    let mut buf = Vec::new();
    tree.get_line_content(n, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn main() {
    let mut builder = TreeBuilder::new();
    builder.accept(b"fn main() {\n");
    builder.accept(b"    todo!()\n");
    builder.accept(b"}\n");
    let mut tree = builder.create();

    assert_eq!(tree.line_count(), 4);
    assert_eq!(line(&tree, 2), "    todo!()");

    // Replace the body of the function.
    let body = tree.get_line_range_with_newline(2);
    tree.remove(body.first, body.last - body.first);
    tree.insert(body.first, b"    println!(\"hello\");\n");
    assert_eq!(line(&tree, 2), "    println!(\"hello\");");

    // Walk the document and count bytes per line.
    for n in 1..=tree.line_count() {
        let range = tree.get_line_range(n);
        println!("line {n}: {:2} bytes  |{}|", range.last - range.first, line(&tree, n));
    }

    // The terminating line feed of line 1 sits just before line 2.
    let second = tree.get_line_range(2);
    assert_eq!(tree.at(second.first - 1), b'\n');
    println!("total: {} bytes, {} lines", tree.length(), tree.line_count());
}
