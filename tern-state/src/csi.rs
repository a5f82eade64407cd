use log::debug;
use tern_vte::CsiArg;

use crate::index::Rect;
use crate::mode::{ModeFlags, MouseEncoding, MouseProtocol, PrivateMode};
use crate::screen::{CursorShape, Property, Screen, ScreenMode};
use crate::state::State;

/// Argument accessor with a command-specific default.
fn arg(args: &[CsiArg], index: usize, default: u32) -> u32 {
    args.get(index).copied().unwrap_or_default().or(default)
}

/// A repeat count: defaults to 1, and an explicit 0 also means 1.
/// Clamped well below `i32::MAX` so sign arithmetic stays safe.
fn count(args: &[CsiArg], index: usize) -> u32 {
    arg(args, index, 1).clamp(1, u32::from(u16::MAX))
}

fn as_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Dispatch a completed CSI sequence.
pub(crate) fn perform<S: Screen>(
    state: &mut State,
    screen: &mut S,
    leader: &[u8],
    args: &[CsiArg],
    intermediates: &[u8],
    byte: u8,
) {
    match (leader, intermediates, byte) {
        // ICH: insert blanks at the cursor.
        ([], [], b'@') => {
            let rect = cursor_row_to_margin(state);
            state.scroll_rect(screen, rect, 0, count(args, 0) as i32);
        },
        // CUU/CUD/CUF/CUB: relative motion.
        ([], [], b'A') => state.move_rel(-(count(args, 0) as i32), 0),
        ([], [], b'B' | b'e') => state.move_rel(count(args, 0) as i32, 0),
        ([], [], b'C' | b'a') => state.move_rel(0, count(args, 0) as i32),
        ([], [], b'D') => state.move_rel(0, -(count(args, 0) as i32)),
        // CNL/CPL: relative vertical motion to the first column.
        ([], [], b'E') => {
            state.move_rel(count(args, 0) as i32, 0);
            state.carriage_return();
        },
        ([], [], b'F') => {
            state.move_rel(-(count(args, 0) as i32), 0);
            state.carriage_return();
        },
        // CHA/HPA: absolute column.
        ([], [], b'G' | b'`') => {
            let (_, col_base) = state.origin_base();
            let col = col_base + as_u16(arg(args, 0, 1)).saturating_sub(1);
            state.goto(state.cursor().row, col);
        },
        // CUP/HVP: absolute position, 1-based on the wire.
        ([], [], b'H' | b'f') => {
            state.goto_wire(as_u16(arg(args, 0, 1)), as_u16(arg(args, 1, 1)));
        },
        // CHT: forward tabulation.
        ([], [], b'I') => {
            for _ in 0..count(args, 0) {
                state.tab();
            }
        },
        // ED: erase in display.
        ([], [], b'J') => erase_in_display(state, screen, arg(args, 0, 0)),
        // EL: erase in line.
        ([], [], b'K') => erase_in_line(state, screen, arg(args, 0, 0)),
        // IL/DL: insert/delete lines at the cursor.
        ([], [], b'L') => insert_delete_lines(state, screen, count(args, 0) as i32),
        ([], [], b'M') => {
            insert_delete_lines(state, screen, -(count(args, 0) as i32));
        },
        // DCH: delete characters at the cursor.
        ([], [], b'P') => {
            let rect = cursor_row_to_margin(state);
            state.scroll_rect(screen, rect, 0, -(count(args, 0) as i32));
        },
        // SU/SD: scroll the region.
        ([], [], b'S') => {
            let region = state.scroll_region();
            state.scroll_rect(screen, region, -(count(args, 0) as i32), 0);
        },
        ([], [], b'T') => {
            let region = state.scroll_region();
            state.scroll_rect(screen, region, count(args, 0) as i32, 0);
        },
        // ECH: erase characters at the cursor.
        ([], [], b'X') => {
            let pos = state.cursor();
            let (_, cols) = state.size();
            let end = pos.col.saturating_add(as_u16(count(args, 0))).min(cols);
            let rect = Rect::new(pos.row, pos.row + 1, pos.col, end);
            state.erase_rect(screen, rect);
        },
        // CBT: backward tabulation.
        ([], [], b'Z') => {
            for _ in 0..count(args, 0) {
                state.tab_backward();
            }
        },
        // VPA: absolute row.
        ([], [], b'd') => {
            let (row_base, _) = state.origin_base();
            let row = row_base + as_u16(arg(args, 0, 1)).saturating_sub(1);
            state.goto(row, state.cursor().col);
        },
        // TBC: clear tab stops.
        ([], [], b'g') => match arg(args, 0, 0) {
            0 => state.clear_tabstop(false),
            3 => state.clear_tabstop(true),
            mode => debug!("unhandled TBC mode {mode}"),
        },
        // SM/RM: ANSI modes.
        ([], [], b'h') => set_ansi_modes(state, args, true),
        ([], [], b'l') => set_ansi_modes(state, args, false),
        // DECSET/DECRST: private modes.
        ([b'?'], [], b'h') => set_private_modes(state, screen, args, true),
        ([b'?'], [], b'l') => set_private_modes(state, screen, args, false),
        // SGR.
        ([], [], b'm') => {
            let mut pen = state.pen;
            pen.apply_sgr(args);
            if pen != state.pen {
                state.pen = pen;
                state.pen_dirty = true;
            }
        },
        // DECSTBM: vertical margins. An omitted bottom means full extent.
        ([], [], b'r') => {
            let (rows, _) = state.size();
            state.set_vertical_margins(
                as_u16(arg(args, 0, 1)),
                as_u16(arg(args, 1, u32::from(rows))),
            );
        },
        // DECSLRM when margin mode is on, SCOSC otherwise.
        ([], [], b's') => {
            if state.mode.contains(ModeFlags::LEFT_RIGHT_MARGINS) {
                let (_, cols) = state.size();
                state.set_horizontal_margins(
                    as_u16(arg(args, 0, 1)),
                    as_u16(arg(args, 1, u32::from(cols))),
                );
            } else {
                state.save_cursor();
            }
        },
        // SCORC.
        ([], [], b'u') => state.restore_cursor(screen),
        // DECSCUSR: cursor style.
        ([], [b' '], b'q') => set_cursor_style(state, screen, arg(args, 0, 0)),
        _ => debug!(
            "unhandled CSI leader={leader:02x?} args={args:?} \
             intermediates={intermediates:02x?} final={:?}",
            byte as char
        ),
    }
}

/// The strip from the cursor to the right margin on the cursor row; ICH
/// and DCH shift within it.
fn cursor_row_to_margin(state: &State) -> Rect {
    let pos = state.cursor();
    Rect::new(pos.row, pos.row + 1, pos.col, state.right_margin())
}

/// IL (positive) / DL (negative), expressed through the scroll primitive
/// over the sub-region below the cursor.
fn insert_delete_lines<S: Screen>(state: &mut State, screen: &mut S, lines: i32) {
    let pos = state.cursor();
    let region = state.scroll_region();
    if !(region.start_row..region.end_row).contains(&pos.row) {
        return;
    }

    let rect = Rect::new(
        pos.row,
        region.end_row,
        region.start_col,
        region.end_col,
    );
    state.scroll_rect(screen, rect, lines, 0);
}

fn erase_in_display<S: Screen>(state: &mut State, screen: &mut S, mode: u32) {
    let pos = state.cursor();
    let (rows, cols) = state.size();

    match mode {
        // Cursor to end of display.
        0 => {
            state.erase_rect(screen, Rect::new(pos.row, pos.row + 1, pos.col, cols));
            state.erase_rect(screen, Rect::new(pos.row + 1, rows, 0, cols));
        },
        // Start of display to cursor, inclusive.
        1 => {
            state.erase_rect(screen, Rect::new(0, pos.row, 0, cols));
            state.erase_rect(screen, Rect::new(pos.row, pos.row + 1, 0, pos.col + 1));
        },
        // Whole display.
        2 => state.erase_rect(screen, Rect::new(0, rows, 0, cols)),
        _ => debug!("unhandled ED mode {mode}"),
    }
}

fn erase_in_line<S: Screen>(state: &mut State, screen: &mut S, mode: u32) {
    let pos = state.cursor();
    let (_, cols) = state.size();

    match mode {
        0 => state.erase_rect(screen, Rect::new(pos.row, pos.row + 1, pos.col, cols)),
        1 => {
            state.erase_rect(screen, Rect::new(pos.row, pos.row + 1, 0, pos.col + 1));
        },
        2 => state.erase_rect(screen, Rect::new(pos.row, pos.row + 1, 0, cols)),
        _ => debug!("unhandled EL mode {mode}"),
    }
}

fn set_ansi_modes(state: &mut State, args: &[CsiArg], value: bool) {
    for arg in args {
        match arg.or(0) {
            20 => state.mode.set(ModeFlags::NEWLINE, value),
            number => debug!("unhandled ANSI mode {number}"),
        }
    }
}

fn set_private_modes<S: Screen>(
    state: &mut State,
    screen: &mut S,
    args: &[CsiArg],
    value: bool,
) {
    for arg in args {
        let number = arg.or(0);
        let Some(mode) = PrivateMode::from_raw(number) else {
            debug!("unhandled private mode {number}");
            continue;
        };

        match mode {
            PrivateMode::CursorKeys => {
                state.mode.set(ModeFlags::CURSOR_KEYS, value);
            },
            PrivateMode::ReverseVideo => {
                screen.set_mode(ScreenMode::ReverseVideo, value);
            },
            PrivateMode::Origin => {
                state.mode.set(ModeFlags::ORIGIN, value);
                state.goto_wire(1, 1);
            },
            PrivateMode::Autowrap => {
                state.mode.set(ModeFlags::AUTOWRAP, value);
            },
            PrivateMode::CursorBlink => {
                state.mode.set(ModeFlags::CURSOR_BLINK, value);
                screen.set_property(Property::CursorBlink(value));
            },
            PrivateMode::CursorVisible => {
                state.mode.set(ModeFlags::CURSOR_VISIBLE, value);
                screen.set_property(Property::CursorVisible(value));
            },
            PrivateMode::LeftRightMargins => {
                state.mode.set(ModeFlags::LEFT_RIGHT_MARGINS, value);
                let (_, cols) = state.size();
                state.scroll_left = 0;
                state.scroll_right = cols;
            },
            PrivateMode::AltScreenPlain => {
                state.switch_alt_screen(screen, value, false);
            },
            PrivateMode::AltScreen => {
                state.switch_alt_screen(screen, value, true);
            },
            PrivateMode::SaveCursor => {
                if value {
                    state.save_cursor();
                } else {
                    state.restore_cursor(screen);
                }
            },
            PrivateMode::AltScreenAndSaveCursor => {
                if value {
                    state.save_cursor();
                    state.switch_alt_screen(screen, true, true);
                } else {
                    state.switch_alt_screen(screen, false, false);
                    state.restore_cursor(screen);
                }
            },
            PrivateMode::MouseClicks
            | PrivateMode::MouseDrag
            | PrivateMode::MouseMove => {
                state.mouse_protocol = if value {
                    match mode {
                        PrivateMode::MouseClicks => MouseProtocol::Click,
                        PrivateMode::MouseDrag => MouseProtocol::Drag,
                        _ => MouseProtocol::Move,
                    }
                } else {
                    MouseProtocol::None
                };
                screen.set_property(Property::Mouse(state.mouse_protocol));
            },
            PrivateMode::MouseUtf8 => {
                set_mouse_encoding(state, MouseEncoding::Utf8, value);
            },
            PrivateMode::MouseSgr => {
                set_mouse_encoding(state, MouseEncoding::Sgr, value);
            },
            PrivateMode::MouseRxvt => {
                set_mouse_encoding(state, MouseEncoding::Rxvt, value);
            },
            PrivateMode::FocusReport => {
                state.mode.set(ModeFlags::FOCUS_REPORT, value);
            },
            PrivateMode::BracketedPaste => {
                state.mode.set(ModeFlags::BRACKETED_PASTE, value);
            },
        }
    }
}

fn set_mouse_encoding(state: &mut State, encoding: MouseEncoding, value: bool) {
    if value {
        state.mouse_encoding = encoding;
    } else if state.mouse_encoding == encoding {
        state.mouse_encoding = MouseEncoding::X10;
    }
}

fn set_cursor_style<S: Screen>(state: &mut State, screen: &mut S, style: u32) {
    let (shape, blink) = match style {
        0 | 1 => (CursorShape::Block, true),
        2 => (CursorShape::Block, false),
        3 => (CursorShape::Underline, true),
        4 => (CursorShape::Underline, false),
        5 => (CursorShape::Bar, true),
        6 => (CursorShape::Bar, false),
        other => {
            debug!("unhandled cursor style {other}");
            return;
        },
    };

    state.cursor_shape = shape;
    state.mode.set(ModeFlags::CURSOR_BLINK, blink);
    screen.set_property(Property::CursorShape(shape));
    screen.set_property(Property::CursorBlink(blink));
}
