//! Embeddable terminal-emulation engine.
//!
//! Feed [`Terminal`] the bytes a program writes to its pty and it keeps a
//! fully interpreted terminal state: cursor, modes, scroll regions,
//! attributes and (with the default [`Surface`] screen) cell contents and
//! damage. Key and mouse events are encoded back into escape sequences in
//! an output queue for the caller to write to the pty.
//!
//! The layering mirrors the byte flow:
//!
//! ```text
//! bytes -> tern_vte::Parser -> tern_state::State -> impl Screen
//! key events -> Terminal -> output queue -> caller
//! ```
//!
//! Embedders with their own renderer implement [`Screen`] and construct
//! the terminal with [`Terminal::with_screen`]; the parser and state
//! machine are also usable on their own through the re-exported crates.

mod buffer;
mod error;
mod input;
mod mouse;
mod terminal;

pub use error::{Error, Result};
pub use input::{KeyCode, KeypadKey, Modifiers};
pub use terminal::Terminal;

pub use tern_state::{
    Color, CursorShape, ModeFlags, MouseEncoding, MouseProtocol, Pen,
    Position, Property, Rect, Rgb, Screen, ScreenMode, State, Underline,
    palette,
};
pub use tern_surface::{Cell, Damage, MAX_CHARS_PER_CELL, Surface};
pub use tern_vte::{Actor, CsiArg, Parser, encoding};
