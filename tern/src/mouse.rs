//! Mouse report encoding.
//!
//! Translates pointer events into the wire format the active protocol and
//! encoding request: X10 byte triplets, UTF-8 extended coordinates, SGR
//! `CSI < b;x;y M/m` or the rxvt numeric form.

use tern_state::{MouseEncoding, Position};

use crate::input::Modifiers;

/// Motion flag added to the button code for drag/move reports.
const MOTION: u8 = 0x20;

/// No-button code used for plain motion and X10 releases.
const RELEASE: u8 = 3;

/// Code for a button event: wheel buttons 4/5 land in the 64+ range.
pub(crate) fn button_code(button: u8, mods: Modifiers) -> u8 {
    let base = match button {
        1..=3 => button - 1,
        4 | 5 => 64 + (button - 4),
        _ => RELEASE,
    };
    base | (mods.bits() << 2)
}

/// Code for a motion event while `button` (or no button) is held.
pub(crate) fn motion_code(button: Option<u8>, mods: Modifiers) -> u8 {
    let base = match button {
        Some(b @ 1..=3) => b - 1,
        _ => RELEASE,
    };
    (base | (mods.bits() << 2)) + MOTION
}

/// Append one mouse report to `out`.
pub(crate) fn encode(
    out: &mut Vec<u8>,
    encoding: MouseEncoding,
    code: u8,
    pressed: bool,
    pos: Position,
) {
    match encoding {
        MouseEncoding::X10 => {
            let code = if pressed { code } else { code & !0x03 | RELEASE };
            out.extend_from_slice(b"\x1b[M");
            out.push(0x20 + code);
            out.push(coordinate_byte(pos.col));
            out.push(coordinate_byte(pos.row));
        },
        MouseEncoding::Utf8 => {
            let code = if pressed { code } else { code & !0x03 | RELEASE };
            out.extend_from_slice(b"\x1b[M");
            out.push(0x20 + code);
            push_utf8_coordinate(out, pos.col);
            push_utf8_coordinate(out, pos.row);
        },
        MouseEncoding::Sgr => {
            out.extend_from_slice(
                format!(
                    "\x1b[<{};{};{}{}",
                    code,
                    pos.col + 1,
                    pos.row + 1,
                    if pressed { 'M' } else { 'm' }
                )
                .as_bytes(),
            );
        },
        MouseEncoding::Rxvt => {
            let code = if pressed { code } else { code & !0x03 | RELEASE };
            out.extend_from_slice(
                format!("\x1b[{};{};{}M", code, pos.col + 1, pos.row + 1)
                    .as_bytes(),
            );
        },
    }
}

/// X10 coordinates are a single byte offset by 33; larger values clamp.
fn coordinate_byte(value: u16) -> u8 {
    u8::try_from(value + 0x21).unwrap_or(u8::MAX)
}

/// The UTF-8 extension encodes each coordinate as one code point.
fn push_utf8_coordinate(out: &mut Vec<u8>, value: u16) {
    let Some(c) = char::from_u32(u32::from(value) + 0x21) else {
        out.push(u8::MAX);
        return;
    };
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x10_press_and_release() {
        let mut out = Vec::new();
        encode(
            &mut out,
            MouseEncoding::X10,
            button_code(1, Modifiers::empty()),
            true,
            Position::new(4, 9),
        );
        assert_eq!(out, b"\x1b[M\x20\x2a\x25");

        out.clear();
        encode(
            &mut out,
            MouseEncoding::X10,
            button_code(1, Modifiers::empty()),
            false,
            Position::new(4, 9),
        );
        assert_eq!(out, b"\x1b[M\x23\x2a\x25");
    }

    #[test]
    fn sgr_distinguishes_release_by_final() {
        let mut out = Vec::new();
        encode(
            &mut out,
            MouseEncoding::Sgr,
            button_code(1, Modifiers::empty()),
            true,
            Position::new(4, 9),
        );
        assert_eq!(out, b"\x1b[<0;10;5M");

        out.clear();
        encode(
            &mut out,
            MouseEncoding::Sgr,
            button_code(1, Modifiers::empty()),
            false,
            Position::new(4, 9),
        );
        assert_eq!(out, b"\x1b[<0;10;5m");
    }

    #[test]
    fn modifiers_shift_into_the_code() {
        assert_eq!(button_code(1, Modifiers::SHIFT), 0x04);
        assert_eq!(button_code(2, Modifiers::CTRL), 0x11);
    }

    #[test]
    fn wheel_buttons_use_the_64_range() {
        assert_eq!(button_code(4, Modifiers::empty()), 64);
        assert_eq!(button_code(5, Modifiers::empty()), 65);
    }

    #[test]
    fn motion_adds_the_drag_flag() {
        assert_eq!(motion_code(Some(1), Modifiers::empty()), 0x20);
        assert_eq!(motion_code(None, Modifiers::empty()), 0x23);
    }
}
