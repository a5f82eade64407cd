//! Drive the state machine into a surface by hand and dump the grid.

use tern_state::State;
use tern_surface::Surface;
use tern_vte::Parser;

fn main() {
    let mut parser = Parser::new();
    let mut state = State::new(10, 40);
    let mut surface = Surface::new(10, 40);

    state.advance(
        &mut parser,
        b"\x1b[1;32mhello\x1b[0m \x1b[4mworld\x1b[0m\r\n\x1b]2;demo\x07",
        &mut surface,
    );

    println!("{}", surface.screen_text());
    println!("cursor: {}", surface.cursor());
    for rect in surface.take_damage() {
        println!("damaged: {rect}");
    }
}
