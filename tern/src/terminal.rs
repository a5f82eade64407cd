use tern_state::{ModeFlags, MouseProtocol, Position, Screen, State};
use tern_surface::Surface;
use tern_vte::Parser;

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::input::{self, KeyCode, Modifiers};
use crate::mouse;

/// Cap for the input re-assembly queue. Unconsumed suffixes are at most a
/// few bytes of a split multi-byte character, but a stalled sink can leave
/// a whole text run behind.
const PENDING_CAP: usize = 4096;

/// Cap for the outbound queue; callers must drain it after each event.
const OUTPUT_CAP: usize = 16384;

/// The top-level terminal object.
///
/// Owns the sequence parser, the state machine, the screen sink, the
/// input re-assembly queue and the output byte queue. Bytes read from the
/// pty go into [`feed`](Self::feed); key and mouse events go into
/// [`key`](Self::key)/[`mouse_button`](Self::mouse_button) and produce
/// bytes in the output queue for the caller to write back to the pty.
///
/// The engine never performs I/O and runs entirely on the calling thread;
/// one logical writer must drive it.
pub struct Terminal<S: Screen = Surface> {
    parser: Parser,
    state: State,
    screen: S,
    pending: Buffer,
    output: Buffer,
    /// Held mouse buttons, for drag reporting.
    mouse_buttons: u8,
    mouse_pos: Position,
}

impl Terminal<Surface> {
    /// A terminal with the built-in cell grid as its screen.
    pub fn new(rows: u16, cols: u16) -> Result<Self> {
        Self::with_screen(rows, cols, Surface::new(rows, cols))
    }

    /// The cell grid.
    pub fn surface(&self) -> &Surface {
        &self.screen
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.screen
    }
}

impl<S: Screen> Terminal<S> {
    /// A terminal emitting mutations to a caller-supplied screen sink.
    pub fn with_screen(rows: u16, cols: u16, screen: S) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidSize { rows, cols });
        }

        Ok(Self {
            parser: Parser::new(),
            state: State::new(rows, cols),
            screen,
            pending: Buffer::new(PENDING_CAP),
            output: Buffer::new(OUTPUT_CAP),
            mouse_buttons: 0,
            mouse_pos: Position::default(),
        })
    }

    /// Interpret a chunk of pty output.
    ///
    /// Accepts any byte slice, including ones that stop mid-sequence; an
    /// unconsumed suffix is kept in the internal re-assembly queue and
    /// transparently prefixed to the next call.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.pending.is_empty() {
            let consumed =
                self.state.advance(&mut self.parser, bytes, &mut self.screen);
            self.pending.extend(&bytes[consumed..]);
        } else {
            self.pending.extend(bytes);
            let consumed = self.state.advance(
                &mut self.parser,
                self.pending.as_slice(),
                &mut self.screen,
            );
            self.pending.drain_front(consumed);
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn size(&self) -> (u16, u16) {
        self.state.size()
    }

    /// Change the terminal extent, re-flowing dependent buffers.
    pub fn resize(&mut self, rows: u16, cols: u16) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidSize { rows, cols });
        }
        self.state.set_size(rows, cols);
        self.screen.resize(rows, cols);
        Ok(())
    }

    /// Switch the byte stream between UTF-8 and single-byte interpretation.
    pub fn set_utf8(&mut self, utf8: bool) {
        self.parser.set_utf8(utf8);
        self.state.set_utf8(utf8);
    }

    // --- Output queue ---------------------------------------------------

    /// Bytes queued for the caller to write to the pty.
    pub fn output(&self) -> &[u8] {
        self.output.as_slice()
    }

    /// Move up to `buf.len()` queued bytes into `buf`.
    pub fn read_output(&mut self, buf: &mut [u8]) -> usize {
        let n = self.output.len().min(buf.len());
        buf[..n].copy_from_slice(&self.output.as_slice()[..n]);
        self.output.drain_front(n);
        n
    }

    /// Drain the whole queue.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.output.take()
    }

    // --- Input encoder --------------------------------------------------

    /// Encode a key press into the output queue.
    pub fn key(&mut self, key: KeyCode, mods: Modifiers) {
        let mut bytes = Vec::new();
        input::encode_key(&mut bytes, key, mods, self.state.mode());
        self.output.extend(&bytes);
    }

    /// Encode a mouse button press or release. Buttons are 1-based;
    /// 4 and 5 are the wheel.
    pub fn mouse_button(&mut self, button: u8, pressed: bool, mods: Modifiers) {
        if (1..=3).contains(&button) {
            let bit = 1 << (button - 1);
            if pressed {
                self.mouse_buttons |= bit;
            } else {
                self.mouse_buttons &= !bit;
            }
        }

        if self.state.mouse_protocol() == MouseProtocol::None {
            return;
        }
        // Wheel releases are never reported.
        if !pressed && button >= 4 {
            return;
        }

        let mut bytes = Vec::new();
        mouse::encode(
            &mut bytes,
            self.state.mouse_encoding(),
            mouse::button_code(button, mods),
            pressed,
            self.mouse_pos,
        );
        self.output.extend(&bytes);
    }

    /// Report pointer motion to `pos` (cell coordinates).
    pub fn mouse_move(&mut self, pos: Position, mods: Modifiers) {
        if pos == self.mouse_pos {
            return;
        }
        self.mouse_pos = pos;

        let held = lowest_button(self.mouse_buttons);
        let wanted = match self.state.mouse_protocol() {
            MouseProtocol::Move => true,
            MouseProtocol::Drag => held.is_some(),
            _ => false,
        };
        if !wanted {
            return;
        }

        let mut bytes = Vec::new();
        mouse::encode(
            &mut bytes,
            self.state.mouse_encoding(),
            mouse::motion_code(held, mods),
            true,
            pos,
        );
        self.output.extend(&bytes);
    }

    /// Bracketed-paste framing; no-ops unless the application enabled it.
    pub fn paste_start(&mut self) {
        if self.state.mode().contains(ModeFlags::BRACKETED_PASTE) {
            self.output.extend(b"\x1b[200~");
        }
    }

    pub fn paste_end(&mut self) {
        if self.state.mode().contains(ModeFlags::BRACKETED_PASTE) {
            self.output.extend(b"\x1b[201~");
        }
    }

    /// Report a focus change when the application asked for them.
    pub fn focus(&mut self, focused: bool) {
        if self.state.mode().contains(ModeFlags::FOCUS_REPORT) {
            self.output
                .extend(if focused { b"\x1b[I" } else { b"\x1b[O" });
        }
    }
}

fn lowest_button(mask: u8) -> Option<u8> {
    (1..=3).find(|button| mask & (1 << (button - 1)) != 0)
}
