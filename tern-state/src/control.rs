use log::debug;

use crate::screen::Screen;
use crate::state::State;

/// Dispatch a C0/C1 control byte.
///
/// C1 controls arrive either as raw 8-bit bytes or already hoisted from
/// their `ESC`-prefixed 7-bit forms by the parser.
pub(crate) fn perform<S: Screen>(state: &mut State, screen: &mut S, byte: u8) {
    match byte {
        // BEL
        0x07 => screen.bell(),
        // BS
        0x08 => state.backspace(),
        // HT
        0x09 => state.tab(),
        // LF, VT and FF all line feed.
        0x0a..=0x0c => {
            state.linefeed(screen);
            if state.mode.contains(crate::ModeFlags::NEWLINE) {
                state.carriage_return();
            }
        },
        // CR
        0x0d => state.carriage_return(),
        // SO: select G1.
        0x0e => state.shift_charset(1),
        // SI: select G0.
        0x0f => state.shift_charset(0),
        // IND
        0x84 => state.linefeed(screen),
        // NEL
        0x85 => {
            state.linefeed(screen);
            state.carriage_return();
        },
        // HTS
        0x88 => state.set_tabstop(),
        // RI
        0x8d => state.reverse_index(screen),
        _ => debug!("unhandled control {byte:#04x}"),
    }
}
