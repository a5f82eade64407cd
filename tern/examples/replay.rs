//! Feed captured pty output through the engine and print the final
//! screen, e.g. `script -qc ls /dev/null | cargo run --example replay`.

use std::io::Read;

use tern::Terminal;

fn main() {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .expect("read stdin");

    let mut term = Terminal::new(25, 80).expect("terminal");
    term.feed(&bytes);

    println!("{}", term.surface().screen_text());
    if let Some(title) = term.surface().title() {
        println!("[title: {title}]");
    }
}
