use log::debug;

use crate::screen::Screen;
use crate::state::{Charset, State};

/// Dispatch a two-part escape sequence (intermediates + final byte).
pub(crate) fn perform<S: Screen>(
    state: &mut State,
    screen: &mut S,
    intermediates: &[u8],
    byte: u8,
) {
    match (byte, intermediates) {
        // RIS: full reset.
        (b'c', []) => state.reset(screen),
        // DECSC: save cursor.
        (b'7', []) => state.save_cursor(),
        // DECRC: restore cursor.
        (b'8', []) => state.restore_cursor(screen),
        // DECPAM: application keypad.
        (b'=', []) => state.set_keypad_application(true),
        // DECPNM: numeric keypad.
        (b'>', []) => state.set_keypad_application(false),
        // DECALN: fill the screen with E.
        (b'8', [b'#']) => screen_alignment(state, screen),
        // Charset designation for G0/G1.
        (_, [slot @ (b'(' | b')')]) => {
            let slot = usize::from(*slot == b')');
            match byte {
                b'0' => state.designate_charset(slot, Charset::DecSpecialGraphics),
                b'A' => state.designate_charset(slot, Charset::Uk),
                b'B' => state.designate_charset(slot, Charset::Ascii),
                _ => debug!("unhandled charset designator {:?}", byte as char),
            }
        },
        // ST arrives here when a string was already dispatched.
        (b'\\', []) => {},
        _ => debug!(
            "unhandled escape {:02x?} {:?}",
            intermediates, byte as char
        ),
    }
}

/// DECALN fills every cell with `E` using a default pen.
fn screen_alignment<S: Screen>(state: &mut State, screen: &mut S) {
    state.pen = Default::default();
    state.pen_dirty = true;
    state.flush_pen(screen);

    let (rows, cols) = state.size();
    for row in 0..rows {
        for col in 0..cols {
            screen.put_glyph(
                &['E'],
                1,
                crate::Position::new(row, col),
                &state.pen,
            );
        }
    }
    state.goto(0, 0);
}
