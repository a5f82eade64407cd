//! The screen mutation sink.
//!
//! The state machine converts every recognized command into zero or more
//! calls on a [`Screen`] implementation. All methods have default
//! implementations so embedders only override the mutations they can
//! render; the boolean-returning hooks report whether the sink handled the
//! operation, letting the state machine fall back to a synthesized
//! equivalent (cell-by-cell scrolling) or skip a side effect (the
//! alternate-screen erase).

use crate::index::{Position, Rect};
use crate::mode::MouseProtocol;
use crate::pen::Pen;

/// Cursor glyph shape requested via DECSCUSR or `OSC 50`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Modes the rendering layer owns; the return value of
/// [`Screen::set_mode`] reports whether the switch actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    /// The alternate screen buffer.
    AltScreen,
    /// DECSCNM reverse video.
    ReverseVideo,
}

/// A property pushed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property<'a> {
    Title(&'a str),
    IconName(&'a str),
    CursorVisible(bool),
    CursorBlink(bool),
    CursorShape(CursorShape),
    /// The mouse events the application now wants reported.
    Mouse(MouseProtocol),
}

/// Receiver for screen mutations emitted by the state machine.
pub trait Screen {
    /// Place a glyph (one base character plus combining characters) at
    /// `pos`. `width` is the number of columns the glyph occupies.
    fn put_glyph(&mut self, _chars: &[char], _width: u8, _pos: Position, _pen: &Pen) {}

    /// The cursor moved. `visible` mirrors the DECTCEM mode.
    fn move_cursor(&mut self, _new: Position, _old: Position, _visible: bool) {}

    /// Shift the contents of `rect` by the signed cell counts (positive
    /// moves content toward higher rows/columns). Return `true` when the
    /// sink performed the whole shift, including erasing the vacated
    /// strip; returning `false` makes the state machine synthesize the
    /// same effect through [`copy_cell`](Self::copy_cell) and
    /// [`erase`](Self::erase).
    fn scroll(&mut self, _rect: Rect, _downward: i32, _rightward: i32) -> bool {
        false
    }

    /// Copy a single cell. Emitted in an order that never reads a cell
    /// already overwritten by the same operation.
    fn copy_cell(&mut self, _dest: Position, _src: Position) {}

    /// Erase every cell in `rect` using the background of `pen`.
    fn erase(&mut self, _rect: Rect, _pen: &Pen) {}

    /// The pen changed; subsequent glyphs use the new value.
    fn set_pen(&mut self, _pen: &Pen) {}

    /// Switch a mode the rendering layer owns. Return `true` if the
    /// switch was performed.
    fn set_mode(&mut self, _mode: ScreenMode, _value: bool) -> bool {
        false
    }

    /// A property changed (window title, cursor appearance, mouse
    /// interest).
    fn set_property(&mut self, _prop: Property<'_>) {}

    /// BEL was received.
    fn bell(&mut self) {}

    /// The terminal was resized; dependent buffers must re-allocate.
    fn resize(&mut self, _rows: u16, _cols: u16) {}
}

/// A sink that ignores everything; useful for driving the state machine
/// for its side effects alone.
impl Screen for () {}
