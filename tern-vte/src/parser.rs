use log::debug;

use crate::actor::Actor;
use crate::csi::CsiArg;

const MAX_INTERMEDIATES: usize = 4;
const MAX_LEADER: usize = 4;
const MAX_ARGS: usize = 16;
const MAX_STRING: usize = 4096;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Ground,
    Escape,
    CsiLeader,
    CsiParam,
    CsiIntermediate,
    OscString,
    DcsString,
    /// An `ESC` was seen while collecting an OSC/DCS string; the next byte
    /// decides between String Terminator and a fresh escape sequence.
    StringEscape,
}

/// Resumable parser for the VT control sequence grammar.
///
/// Bytes are pushed in with [`feed`](Self::feed); recognized units are
/// reported to the supplied [`Actor`]. The parser never looks ahead past
/// the bytes it was given: a chunk that stops mid-sequence leaves the
/// partial sequence buffered internally, and the next `feed` call resumes
/// it transparently.
///
/// Every state has a defined transition for every byte value, so no input
/// can wedge the parser; malformed bytes are dropped or abort the current
/// sequence back to ground.
pub struct Parser {
    state: State,
    utf8: bool,
    intermediates: [u8; MAX_INTERMEDIATES],
    intermediate_len: usize,
    leader: [u8; MAX_LEADER],
    leader_len: usize,
    args: [CsiArg; MAX_ARGS],
    arg_len: usize,
    args_full: bool,
    string_buf: Vec<u8>,
    string_full: bool,
    /// Which string state a [`State::StringEscape`] returns to.
    string_return: State,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            state: State::Ground,
            utf8: true,
            intermediates: [0; MAX_INTERMEDIATES],
            intermediate_len: 0,
            leader: [0; MAX_LEADER],
            leader_len: 0,
            args: [CsiArg::missing(); MAX_ARGS],
            arg_len: 0,
            args_full: false,
            string_buf: Vec::new(),
            string_full: false,
            string_return: State::Ground,
        }
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the ground state treats high bytes as UTF-8 text.
    ///
    /// When disabled, single bytes 0x90/0x9B/0x9D act as the 8-bit C1
    /// introducers for DCS/CSI/OSC and 0x9C terminates strings.
    pub fn set_utf8(&mut self, utf8: bool) {
        self.utf8 = utf8;
    }

    pub fn utf8(&self) -> bool {
        self.utf8
    }

    /// Advance the parser over `bytes`, reporting events to `actor`.
    ///
    /// Returns the number of bytes consumed. This is less than the input
    /// length only when a printable run at the end of the input was left
    /// partially unconsumed by [`Actor::text`] (a truncated multi-byte
    /// character); the caller must present the tail again in front of the
    /// next chunk.
    pub fn feed<A: Actor>(&mut self, bytes: &[u8], actor: &mut A) -> usize {
        let mut pos = 0;

        while pos < bytes.len() {
            let byte = bytes[pos];

            if self.state == State::Ground && is_text(byte, self.utf8) {
                let run_end = bytes[pos..]
                    .iter()
                    .position(|&b| !is_text(b, self.utf8))
                    .map_or(bytes.len(), |n| pos + n);

                let mut consumed = actor.text(&bytes[pos..run_end]);
                if consumed < run_end - pos {
                    if run_end == bytes.len() {
                        // Truncated multi-byte tail; hand it back to the
                        // caller for re-presentation.
                        return pos + consumed;
                    }
                    if consumed == 0 {
                        debug!("text callback consumed nothing; forcing one byte");
                        consumed = 1;
                    }
                }
                pos += consumed;
                continue;
            }

            self.advance(byte, actor);
            pos += 1;
        }

        pos
    }

    fn advance<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        // Byte classes that take priority over the current state.
        match byte {
            // NUL and DEL are filler in every state; inside a string they
            // are skipped without touching the payload.
            0x00 | 0x7f => return,
            // CAN/SUB abort whatever is in progress.
            0x18 | 0x1a => {
                self.state = State::Ground;
                return;
            },
            0x1b => {
                match self.state {
                    State::OscString | State::DcsString => {
                        self.string_return = self.state;
                        self.state = State::StringEscape;
                    },
                    State::StringEscape => {
                        // ESC ESC: the string is over either way.
                        self.dispatch_string(actor);
                        self.enter_escape();
                    },
                    _ => self.enter_escape(),
                }
                return;
            },
            // BEL doubles as a string terminator.
            0x07 if self.in_string() => {
                self.dispatch_string(actor);
                self.state = State::Ground;
                return;
            },
            // Remaining C0 controls dispatch immediately without
            // disturbing sequence or string state.
            b if b < 0x20 => {
                actor.control(b);
                return;
            },
            // 8-bit String Terminator.
            0x9c if !self.utf8 && self.in_string() => {
                self.dispatch_string(actor);
                self.state = State::Ground;
                return;
            },
            _ => {},
        }

        match self.state {
            State::Ground => self.ground(byte, actor),
            State::Escape => self.escape(byte, actor),
            State::CsiLeader => self.csi_leader(byte, actor),
            State::CsiParam => self.csi_param(byte, actor),
            State::CsiIntermediate => self.csi_intermediate(byte, actor),
            State::OscString | State::DcsString => self.string_put(byte),
            State::StringEscape => self.string_escape(byte, actor),
        }
    }

    /// Non-text bytes reaching ground: 8-bit C1 controls.
    fn ground<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        debug_assert!(!is_text(byte, self.utf8));

        match byte {
            0x90 => self.enter_string(State::DcsString),
            0x9b => self.enter_csi(),
            0x9d => self.enter_string(State::OscString),
            0x80..=0x9f => actor.control(byte),
            _ => debug!("unhandled ground byte {byte:#04x}"),
        }
    }

    fn escape<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        match byte {
            0x20..=0x2f => self.collect_intermediate(byte),
            b'P' if self.intermediate_len == 0 => {
                self.enter_string(State::DcsString);
            },
            b'[' if self.intermediate_len == 0 => self.enter_csi(),
            b']' if self.intermediate_len == 0 => {
                self.enter_string(State::OscString);
            },
            // With no intermediates, 0x40..=0x5F is the 7-bit form of a C1
            // control.
            0x40..=0x5f if self.intermediate_len == 0 => {
                self.state = State::Ground;
                actor.control(byte + 0x40);
            },
            0x30..=0x7e => {
                self.state = State::Ground;
                actor.escape(&self.intermediates[..self.intermediate_len], byte);
            },
            _ => {
                debug!("aborting escape on byte {byte:#04x}");
                self.state = State::Ground;
            },
        }
    }

    fn csi_leader<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        match byte {
            0x3c..=0x3f => {
                if self.leader_len < MAX_LEADER {
                    self.leader[self.leader_len] = byte;
                    self.leader_len += 1;
                } else {
                    debug!("CSI leader overflow; dropping {byte:#04x}");
                }
            },
            _ => {
                // Anything else starts the argument list with one missing
                // argument.
                self.args[0] = CsiArg::missing();
                self.arg_len = 1;
                self.state = State::CsiParam;
                self.csi_param(byte, actor);
            },
        }
    }

    fn csi_param<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        match byte {
            // Once the argument list overflowed, excess parameter bytes
            // are dropped without touching the accumulated slots.
            b'0'..=b'9' if !self.args_full => {
                self.args[self.arg_len - 1].push_digit(u32::from(byte - b'0'));
            },
            b':' if !self.args_full => {
                self.args[self.arg_len - 1].mark_subparam();
                self.next_arg();
            },
            b';' => self.next_arg(),
            b'0'..=b'9' | b':' => {},
            0x20..=0x2f => {
                self.state = State::CsiIntermediate;
                self.collect_intermediate(byte);
            },
            0x40..=0x7e => self.dispatch_csi(byte, actor),
            _ => debug!("ignoring CSI parameter byte {byte:#04x}"),
        }
    }

    fn csi_intermediate<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        match byte {
            0x20..=0x2f => self.collect_intermediate(byte),
            0x40..=0x7e => self.dispatch_csi(byte, actor),
            _ => debug!("ignoring CSI intermediate byte {byte:#04x}"),
        }
    }

    fn string_put(&mut self, byte: u8) {
        if self.string_buf.len() < MAX_STRING {
            self.string_buf.push(byte);
        } else if !self.string_full {
            debug!("string payload exceeds {MAX_STRING} bytes; truncating");
            self.string_full = true;
        }
    }

    fn string_escape<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        if byte == b'\\' {
            // ESC \ is the String Terminator.
            self.dispatch_string(actor);
            self.state = State::Ground;
        } else {
            // The escape aborts the string; the accumulated payload is
            // still delivered, then the byte is processed as the start of
            // a regular escape sequence.
            self.dispatch_string(actor);
            self.enter_escape();
            self.escape(byte, actor);
        }
    }

    fn collect_intermediate(&mut self, byte: u8) {
        if self.intermediate_len < MAX_INTERMEDIATES {
            self.intermediates[self.intermediate_len] = byte;
            self.intermediate_len += 1;
        } else {
            debug!("intermediate overflow; dropping {byte:#04x}");
        }
    }

    fn next_arg(&mut self) {
        if self.arg_len < MAX_ARGS {
            self.args[self.arg_len] = CsiArg::missing();
            self.arg_len += 1;
        } else if !self.args_full {
            debug!("CSI argument overflow; dropping further arguments");
            self.args_full = true;
        }
    }

    fn dispatch_csi<A: Actor>(&mut self, byte: u8, actor: &mut A) {
        self.state = State::Ground;
        actor.csi(
            &self.leader[..self.leader_len],
            &self.args[..self.arg_len],
            &self.intermediates[..self.intermediate_len],
            byte,
        );
    }

    fn dispatch_string<A: Actor>(&mut self, actor: &mut A) {
        let kind = match self.state {
            State::StringEscape => self.string_return,
            state => state,
        };
        match kind {
            State::OscString => actor.osc(&self.string_buf),
            State::DcsString => actor.dcs(&self.string_buf),
            _ => unreachable!("dispatch_string outside a string state"),
        }
    }

    fn in_string(&self) -> bool {
        matches!(self.state, State::OscString | State::DcsString)
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.intermediate_len = 0;
    }

    fn enter_csi(&mut self) {
        self.state = State::CsiLeader;
        self.leader_len = 0;
        self.arg_len = 0;
        self.args_full = false;
        self.intermediate_len = 0;
    }

    fn enter_string(&mut self, state: State) {
        debug_assert!(matches!(state, State::OscString | State::DcsString));
        self.state = state;
        self.string_buf.clear();
        self.string_full = false;
    }
}

/// Whether `byte` belongs to a printable text run in ground state.
#[inline]
const fn is_text(byte: u8, utf8: bool) -> bool {
    match byte {
        0x00..=0x1f | 0x7f => false,
        0x80..=0x9f => utf8,
        _ => true,
    }
}
