//! Keyboard input encoding.
//!
//! The inverse direction of the engine: logical key events become the
//! escape sequences a program behind the pty expects to read, honoring
//! DEC cursor-key and keypad application modes and the xterm modifier
//! parameter convention.

use bitflags::bitflags;
use tern_state::ModeFlags;

bitflags! {
    /// Modifier keys held during a key or mouse event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

impl Modifiers {
    /// The xterm wire parameter: `1 + bitmap`.
    pub(crate) fn param(self) -> u8 {
        1 + self.bits()
    }
}

/// A logical key, independent of any keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character, already resolved for Shift by the caller.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key, 1-based.
    Function(u8),
    Keypad(KeypadKey),
}

/// Keys on the numeric keypad, sensitive to DEC keypad application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(u8),
    Enter,
    Plus,
    Minus,
    Multiply,
    Divide,
    Period,
    Comma,
    Equal,
}

impl KeypadKey {
    /// (literal byte, `SS3` letter in application mode).
    fn encoding(self) -> (u8, u8) {
        match self {
            Self::Digit(n) => (b'0' + n.min(9), b'p' + n.min(9)),
            Self::Enter => (b'\r', b'M'),
            Self::Plus => (b'+', b'k'),
            Self::Minus => (b'-', b'm'),
            Self::Multiply => (b'*', b'j'),
            Self::Divide => (b'/', b'o'),
            Self::Period => (b'.', b'n'),
            Self::Comma => (b',', b'l'),
            Self::Equal => (b'=', b'X'),
        }
    }
}

/// Append the encoding of one key event to `out`.
pub(crate) fn encode_key(
    out: &mut Vec<u8>,
    key: KeyCode,
    mods: Modifiers,
    mode: ModeFlags,
) {
    match key {
        KeyCode::Char(c) => encode_char(out, c, mods),
        KeyCode::Enter => {
            literal(out, b'\r', mods);
            if mode.contains(ModeFlags::NEWLINE) {
                out.push(b'\n');
            }
        },
        KeyCode::Tab => literal(out, b'\t', mods),
        KeyCode::Backspace => literal(out, 0x7f, mods),
        KeyCode::Escape => literal(out, 0x1b, mods),
        KeyCode::Up => cursor_key(out, b'A', mods, mode),
        KeyCode::Down => cursor_key(out, b'B', mods, mode),
        KeyCode::Right => cursor_key(out, b'C', mods, mode),
        KeyCode::Left => cursor_key(out, b'D', mods, mode),
        KeyCode::Insert => tilde_key(out, 2, mods),
        KeyCode::Delete => tilde_key(out, 3, mods),
        KeyCode::Home => tilde_key(out, 1, mods),
        KeyCode::End => tilde_key(out, 4, mods),
        KeyCode::PageUp => tilde_key(out, 5, mods),
        KeyCode::PageDown => tilde_key(out, 6, mods),
        KeyCode::Function(n) => function_key(out, n, mods),
        KeyCode::Keypad(key) => {
            let (literal_byte, ss3) = key.encoding();
            if mode.contains(ModeFlags::KEYPAD_APPLICATION) {
                out.extend_from_slice(b"\x1bO");
                out.push(ss3);
            } else {
                literal(out, literal_byte, mods);
            }
        },
    }
}

fn encode_char(out: &mut Vec<u8>, c: char, mods: Modifiers) {
    if mods.contains(Modifiers::ALT) {
        out.push(0x1b);
    }

    // Ctrl folds letters and the @[\]^_ column onto C0 controls.
    if mods.contains(Modifiers::CTRL) && c.is_ascii() {
        let upper = (c as u8).to_ascii_uppercase();
        if (0x40..=0x5f).contains(&upper) {
            out.push(upper & 0x1f);
            return;
        }
        if c == ' ' {
            out.push(0x00);
            return;
        }
    }

    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn literal(out: &mut Vec<u8>, byte: u8, mods: Modifiers) {
    if mods.contains(Modifiers::ALT) {
        out.push(0x1b);
    }
    out.push(byte);
}

fn cursor_key(out: &mut Vec<u8>, letter: u8, mods: Modifiers, mode: ModeFlags) {
    if mods.is_empty() {
        if mode.contains(ModeFlags::CURSOR_KEYS) {
            out.extend_from_slice(b"\x1bO");
        } else {
            out.extend_from_slice(b"\x1b[");
        }
        out.push(letter);
    } else {
        // Modifier parameter forces the CSI form.
        out.extend_from_slice(format!("\x1b[1;{}", mods.param()).as_bytes());
        out.push(letter);
    }
}

fn tilde_key(out: &mut Vec<u8>, number: u8, mods: Modifiers) {
    if mods.is_empty() {
        out.extend_from_slice(format!("\x1b[{number}~").as_bytes());
    } else {
        out.extend_from_slice(
            format!("\x1b[{number};{}~", mods.param()).as_bytes(),
        );
    }
}

fn function_key(out: &mut Vec<u8>, n: u8, mods: Modifiers) {
    match n {
        // F1-F4 are SS3 P..S; a modifier forces the CSI form.
        1..=4 => {
            let letter = b'P' + (n - 1);
            if mods.is_empty() {
                out.extend_from_slice(b"\x1bO");
                out.push(letter);
            } else {
                out.extend_from_slice(
                    format!("\x1b[1;{}", mods.param()).as_bytes(),
                );
                out.push(letter);
            }
        },
        5..=12 => {
            static NUMBERS: [u8; 8] = [15, 17, 18, 19, 20, 21, 23, 24];
            tilde_key(out, NUMBERS[usize::from(n) - 5], mods);
        },
        _ => log::debug!("unhandled function key F{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(key: KeyCode, mods: Modifiers, mode: ModeFlags) -> Vec<u8> {
        let mut out = Vec::new();
        encode_key(&mut out, key, mods, mode);
        out
    }

    fn plain(key: KeyCode) -> Vec<u8> {
        encode(key, Modifiers::empty(), ModeFlags::default())
    }

    #[test]
    fn literal_controls() {
        assert_eq!(plain(KeyCode::Enter), b"\r");
        assert_eq!(plain(KeyCode::Tab), b"\t");
        assert_eq!(plain(KeyCode::Backspace), b"\x7f");
        assert_eq!(plain(KeyCode::Escape), b"\x1b");
    }

    #[test]
    fn plain_characters_are_utf8() {
        assert_eq!(plain(KeyCode::Char('a')), b"a");
        assert_eq!(plain(KeyCode::Char('é')), "é".as_bytes());
    }

    #[test]
    fn ctrl_folds_to_c0() {
        assert_eq!(
            encode(KeyCode::Char('c'), Modifiers::CTRL, ModeFlags::default()),
            b"\x03"
        );
        assert_eq!(
            encode(KeyCode::Char('['), Modifiers::CTRL, ModeFlags::default()),
            b"\x1b"
        );
        assert_eq!(
            encode(KeyCode::Char(' '), Modifiers::CTRL, ModeFlags::default()),
            b"\x00"
        );
    }

    #[test]
    fn alt_prefixes_escape() {
        assert_eq!(
            encode(KeyCode::Char('x'), Modifiers::ALT, ModeFlags::default()),
            b"\x1bx"
        );
        assert_eq!(
            encode(
                KeyCode::Char('c'),
                Modifiers::ALT | Modifiers::CTRL,
                ModeFlags::default()
            ),
            b"\x1b\x03"
        );
    }

    #[test]
    fn cursor_keys_follow_decckm() {
        assert_eq!(plain(KeyCode::Up), b"\x1b[A");
        assert_eq!(
            encode(
                KeyCode::Up,
                Modifiers::empty(),
                ModeFlags::default() | ModeFlags::CURSOR_KEYS
            ),
            b"\x1bOA"
        );
    }

    #[test]
    fn modifiers_use_the_xterm_parameter() {
        // Shift=1, Alt=2, Ctrl=4, plus one.
        assert_eq!(
            encode(KeyCode::Up, Modifiers::SHIFT, ModeFlags::default()),
            b"\x1b[1;2A"
        );
        assert_eq!(
            encode(
                KeyCode::Delete,
                Modifiers::CTRL | Modifiers::SHIFT,
                ModeFlags::default()
            ),
            b"\x1b[3;6~"
        );
        // Modified cursor keys stay CSI even in application mode.
        assert_eq!(
            encode(
                KeyCode::Left,
                Modifiers::CTRL,
                ModeFlags::default() | ModeFlags::CURSOR_KEYS
            ),
            b"\x1b[1;5D"
        );
    }

    #[test]
    fn editing_keys_use_the_tilde_family() {
        assert_eq!(plain(KeyCode::Insert), b"\x1b[2~");
        assert_eq!(plain(KeyCode::Delete), b"\x1b[3~");
        assert_eq!(plain(KeyCode::Home), b"\x1b[1~");
        assert_eq!(plain(KeyCode::End), b"\x1b[4~");
        assert_eq!(plain(KeyCode::PageUp), b"\x1b[5~");
        assert_eq!(plain(KeyCode::PageDown), b"\x1b[6~");
    }

    #[test]
    fn function_keys() {
        assert_eq!(plain(KeyCode::Function(1)), b"\x1bOP");
        assert_eq!(plain(KeyCode::Function(4)), b"\x1bOS");
        assert_eq!(plain(KeyCode::Function(5)), b"\x1b[15~");
        assert_eq!(plain(KeyCode::Function(12)), b"\x1b[24~");
        assert_eq!(
            encode(KeyCode::Function(2), Modifiers::SHIFT, ModeFlags::default()),
            b"\x1b[1;2Q"
        );
    }

    #[test]
    fn keypad_follows_application_mode() {
        let app = ModeFlags::default() | ModeFlags::KEYPAD_APPLICATION;
        assert_eq!(plain(KeyCode::Keypad(KeypadKey::Digit(5))), b"5");
        assert_eq!(
            encode(KeyCode::Keypad(KeypadKey::Digit(5)), Modifiers::empty(), app),
            b"\x1bOu"
        );
        assert_eq!(plain(KeyCode::Keypad(KeypadKey::Enter)), b"\r");
        assert_eq!(
            encode(KeyCode::Keypad(KeypadKey::Enter), Modifiers::empty(), app),
            b"\x1bOM"
        );
    }

    #[test]
    fn enter_honors_newline_mode() {
        assert_eq!(
            encode(
                KeyCode::Enter,
                Modifiers::empty(),
                ModeFlags::default() | ModeFlags::NEWLINE
            ),
            b"\r\n"
        );
    }
}
