use log::debug;
use tern_vte::{Actor, Parser, encoding::Encoding};
use unicode_width::UnicodeWidthChar;

use crate::index::{Position, Rect};
use crate::mode::{ModeFlags, MouseEncoding, MouseProtocol};
use crate::pen::Pen;
use crate::screen::{CursorShape, Property, Screen, ScreenMode};
use crate::{control, csi, esc, osc};

/// Maximum combining characters carried by one glyph.
pub(crate) const MAX_CHARS_PER_GLYPH: usize = 6;

const TAB_INTERVAL: u16 = 8;

/// Character set designated into a G0/G1 slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Charset {
    #[default]
    Ascii,
    DecSpecialGraphics,
    Uk,
}

impl Charset {
    fn encoding(self, utf8: bool) -> Encoding {
        match self {
            Self::Ascii if utf8 => Encoding::Utf8,
            Self::Ascii => Encoding::Ascii,
            Self::DecSpecialGraphics => {
                Encoding::Table(&tern_vte::encoding::DEC_SPECIAL_GRAPHICS)
            },
            Self::Uk => Encoding::Table(&tern_vte::encoding::UK_NATIONAL),
        }
    }
}

/// Snapshot taken by DECSC and restored by DECRC; exactly one slot.
#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    pos: Position,
    pen: Pen,
    at_phantom: bool,
    cursor_visible: bool,
    cursor_blink: bool,
    cursor_shape: CursorShape,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self {
            pos: Position::default(),
            pen: Pen::default(),
            at_phantom: false,
            cursor_visible: true,
            cursor_blink: true,
            cursor_shape: CursorShape::default(),
        }
    }
}

/// The terminal state machine.
///
/// Owns cursor position, scroll regions, mode flags and the current pen;
/// consumes parse events and emits screen mutations. Wire commands that
/// are well-formed but unrecognized are reported through the log and
/// change no state.
pub struct State {
    pub(crate) rows: u16,
    pub(crate) cols: u16,
    pub(crate) pos: Position,
    /// The cursor logically sits one column past the end of the row,
    /// deferring the wrap until the next character is placed.
    pub(crate) at_phantom: bool,
    pub(crate) pen: Pen,
    pub(crate) pen_dirty: bool,
    pub(crate) mode: ModeFlags,
    pub(crate) cursor_shape: CursorShape,
    saved: SavedCursor,
    /// Scroll region rows, half-open.
    pub(crate) scroll_top: u16,
    pub(crate) scroll_bottom: u16,
    /// Scroll region columns, honored when `LEFT_RIGHT_MARGINS` is set.
    pub(crate) scroll_left: u16,
    pub(crate) scroll_right: u16,
    tabstops: Vec<bool>,
    charsets: [Charset; 2],
    active_charset: usize,
    utf8: bool,
    pub(crate) mouse_protocol: MouseProtocol,
    pub(crate) mouse_encoding: MouseEncoding,
    // Most recent glyph, for attaching combining characters.
    glyph_chars: [char; MAX_CHARS_PER_GLYPH],
    glyph_len: usize,
    glyph_pos: Position,
    glyph_width: u8,
    glyph_valid: bool,
}

impl State {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            pos: Position::default(),
            at_phantom: false,
            pen: Pen::default(),
            pen_dirty: false,
            mode: ModeFlags::default(),
            cursor_shape: CursorShape::default(),
            saved: SavedCursor::default(),
            scroll_top: 0,
            scroll_bottom: rows,
            scroll_left: 0,
            scroll_right: cols,
            tabstops: default_tabstops(cols),
            charsets: [Charset::Ascii; 2],
            active_charset: 0,
            utf8: true,
            mouse_protocol: MouseProtocol::default(),
            mouse_encoding: MouseEncoding::default(),
            glyph_chars: ['\0'; MAX_CHARS_PER_GLYPH],
            glyph_len: 0,
            glyph_pos: Position::default(),
            glyph_width: 0,
            glyph_valid: false,
        }
    }

    /// Drive `parser` over `bytes`, interpreting events against this state
    /// and emitting mutations to `screen`. Returns the bytes consumed; a
    /// truncated multi-byte character at the end of input is left for the
    /// caller to re-present.
    pub fn advance<S: Screen>(
        &mut self,
        parser: &mut Parser,
        bytes: &[u8],
        screen: &mut S,
    ) -> usize {
        let mut performer = Performer {
            state: self,
            screen,
        };
        parser.feed(bytes, &mut performer)
    }

    pub fn cursor(&self) -> Position {
        self.pos
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn mode(&self) -> ModeFlags {
        self.mode
    }

    pub fn mouse_protocol(&self) -> MouseProtocol {
        self.mouse_protocol
    }

    pub fn mouse_encoding(&self) -> MouseEncoding {
        self.mouse_encoding
    }

    pub fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    /// The scroll region as a rectangle.
    pub fn scroll_region(&self) -> Rect {
        Rect::new(
            self.scroll_top,
            self.scroll_bottom,
            self.left_margin(),
            self.right_margin(),
        )
    }

    /// Adjust to a new terminal extent, clamping dependent state.
    pub fn set_size(&mut self, rows: u16, cols: u16) {
        self.rows = rows;
        self.cols = cols;
        self.scroll_top = 0;
        self.scroll_bottom = rows;
        self.scroll_left = 0;
        self.scroll_right = cols;
        self.pos.row = self.pos.row.min(rows.saturating_sub(1));
        self.pos.col = self.pos.col.min(cols.saturating_sub(1));
        self.at_phantom = false;
        self.glyph_valid = false;
        self.tabstops = default_tabstops(cols);
    }

    /// Whether text runs decode as UTF-8; must match the owning parser.
    pub fn set_utf8(&mut self, utf8: bool) {
        self.utf8 = utf8;
    }

    /// Full reset (RIS): every mode, region and attribute back to its
    /// power-on default, and the screen erased.
    pub fn reset<S: Screen>(&mut self, screen: &mut S) {
        let utf8 = self.utf8;
        *self = Self::new(self.rows, self.cols);
        self.utf8 = utf8;
        self.pen_dirty = true;
        screen.set_property(Property::CursorVisible(true));
        screen.set_property(Property::CursorBlink(true));
        screen.set_property(Property::CursorShape(CursorShape::default()));
        screen.set_property(Property::Mouse(MouseProtocol::None));
        screen.erase(self.full_rect(), &self.pen);
    }

    pub(crate) fn full_rect(&self) -> Rect {
        Rect::new(0, self.rows, 0, self.cols)
    }

    pub(crate) fn left_margin(&self) -> u16 {
        if self.mode.contains(ModeFlags::LEFT_RIGHT_MARGINS) {
            self.scroll_left
        } else {
            0
        }
    }

    pub(crate) fn right_margin(&self) -> u16 {
        if self.mode.contains(ModeFlags::LEFT_RIGHT_MARGINS) {
            self.scroll_right
        } else {
            self.cols
        }
    }

    pub(crate) fn update_cursor<S: Screen>(
        &mut self,
        screen: &mut S,
        old: Position,
    ) {
        if self.pos != old {
            screen.move_cursor(
                self.pos,
                old,
                self.mode.contains(ModeFlags::CURSOR_VISIBLE),
            );
        }
    }

    pub(crate) fn flush_pen<S: Screen>(&mut self, screen: &mut S) {
        if self.pen_dirty {
            screen.set_pen(&self.pen);
            self.pen_dirty = false;
        }
    }

    // --- Text -----------------------------------------------------------

    pub(crate) fn on_text<S: Screen>(
        &mut self,
        bytes: &[u8],
        screen: &mut S,
    ) -> usize {
        let mut chars = Vec::with_capacity(bytes.len());
        let encoding = self.charsets[self.active_charset].encoding(self.utf8);
        let result = encoding.decode(bytes, &mut chars);

        for c in chars {
            self.put_char(c, screen);
        }

        result.consumed
    }

    fn put_char<S: Screen>(&mut self, c: char, screen: &mut S) {
        let Some(width) = c.width() else {
            debug!("dropping non-printable {c:?}");
            return;
        };

        if width == 0 {
            self.combine_char(c, screen);
            return;
        }
        let width = width as u8;

        if self.at_phantom {
            // Deferred autowrap: the previous character filled the row.
            self.linefeed(screen);
            self.pos.col = self.left_margin();
            self.at_phantom = false;
        }

        let right = self.right_margin();
        if self.pos.col + u16::from(width) > right {
            // A wide glyph that no longer fits wraps early or clamps.
            if self.mode.contains(ModeFlags::AUTOWRAP) {
                self.linefeed(screen);
                self.pos.col = self.left_margin();
            } else {
                self.pos.col = right.saturating_sub(u16::from(width));
            }
        }

        self.flush_pen(screen);
        screen.put_glyph(&[c], width, self.pos, &self.pen);

        self.glyph_chars[0] = c;
        self.glyph_len = 1;
        self.glyph_pos = self.pos;
        self.glyph_width = width;
        self.glyph_valid = true;

        if self.pos.col + u16::from(width) >= right {
            if self.mode.contains(ModeFlags::AUTOWRAP) {
                self.at_phantom = true;
            }
        } else {
            self.pos.col += u16::from(width);
        }
    }

    /// Attach a zero-width character to the most recently placed glyph.
    fn combine_char<S: Screen>(&mut self, c: char, screen: &mut S) {
        if !self.glyph_valid {
            debug!("combining character {c:?} with no preceding glyph");
            return;
        }
        if self.glyph_len == MAX_CHARS_PER_GLYPH {
            debug!("glyph already carries {MAX_CHARS_PER_GLYPH} characters");
            return;
        }

        self.glyph_chars[self.glyph_len] = c;
        self.glyph_len += 1;
        self.flush_pen(screen);
        screen.put_glyph(
            &self.glyph_chars[..self.glyph_len],
            self.glyph_width,
            self.glyph_pos,
            &self.pen,
        );
    }

    // --- Cursor ---------------------------------------------------------

    /// Move to an absolute position, clamping to the screen (or to the
    /// scroll region in origin mode). Used by every motion command.
    pub(crate) fn goto(&mut self, row: u16, col: u16) {
        let (top, bottom) = if self.mode.contains(ModeFlags::ORIGIN) {
            (self.scroll_top, self.scroll_bottom)
        } else {
            (0, self.rows)
        };

        self.pos.row = row.clamp(top, bottom.saturating_sub(1).max(top));
        self.pos.col = col.min(self.cols.saturating_sub(1));
        self.at_phantom = false;
    }

    /// Absolute motion in the 1-based wire coordinate system. In origin
    /// mode, coordinates are relative to the scroll region.
    pub(crate) fn goto_wire(&mut self, row: u16, col: u16) {
        let (row_base, col_base) = self.origin_base();
        self.goto(
            row_base + row.saturating_sub(1),
            col_base + col.saturating_sub(1),
        );
    }

    /// Top-left of the coordinate system wire positions address.
    pub(crate) fn origin_base(&self) -> (u16, u16) {
        if self.mode.contains(ModeFlags::ORIGIN) {
            (self.scroll_top, self.left_margin())
        } else {
            (0, 0)
        }
    }

    pub(crate) fn move_rel(&mut self, rows: i32, cols: i32) {
        let row = add_clamped(self.pos.row, rows);
        let col = add_clamped(self.pos.col, cols);
        self.goto(row, col);
    }

    pub(crate) fn carriage_return(&mut self) {
        let left = self.left_margin();
        self.pos.col = if self.pos.col >= left { left } else { 0 };
        self.at_phantom = false;
    }

    pub(crate) fn linefeed<S: Screen>(&mut self, screen: &mut S) {
        if self.pos.row + 1 == self.scroll_bottom {
            let region = self.scroll_region();
            self.scroll_rect(screen, region, -1, 0);
        } else if self.pos.row + 1 < self.rows {
            self.pos.row += 1;
        }
    }

    pub(crate) fn reverse_index<S: Screen>(&mut self, screen: &mut S) {
        if self.pos.row == self.scroll_top {
            let region = self.scroll_region();
            self.scroll_rect(screen, region, 1, 0);
        } else if self.pos.row > 0 {
            self.pos.row -= 1;
        }
    }

    pub(crate) fn backspace(&mut self) {
        if self.at_phantom {
            self.at_phantom = false;
        } else if self.pos.col > 0 {
            self.pos.col -= 1;
        }
    }

    pub(crate) fn tab(&mut self) {
        // Advance to the next stop, capped one short of the margin.
        while self.pos.col + 1 < self.right_margin() {
            self.pos.col += 1;
            if self.tabstops[self.pos.col as usize] {
                break;
            }
        }
        self.at_phantom = false;
    }

    pub(crate) fn tab_backward(&mut self) {
        while self.pos.col > 0 {
            self.pos.col -= 1;
            if self.tabstops[self.pos.col as usize] {
                break;
            }
        }
        self.at_phantom = false;
    }

    pub(crate) fn set_tabstop(&mut self) {
        if let Some(stop) = self.tabstops.get_mut(self.pos.col as usize) {
            *stop = true;
        }
    }

    pub(crate) fn clear_tabstop(&mut self, all: bool) {
        if all {
            self.tabstops.fill(false);
        } else if let Some(stop) = self.tabstops.get_mut(self.pos.col as usize) {
            *stop = false;
        }
    }

    // --- Saved cursor ---------------------------------------------------

    pub(crate) fn save_cursor(&mut self) {
        self.saved = SavedCursor {
            pos: self.pos,
            pen: self.pen,
            at_phantom: self.at_phantom,
            cursor_visible: self.mode.contains(ModeFlags::CURSOR_VISIBLE),
            cursor_blink: self.mode.contains(ModeFlags::CURSOR_BLINK),
            cursor_shape: self.cursor_shape,
        };
    }

    pub(crate) fn restore_cursor<S: Screen>(&mut self, screen: &mut S) {
        let saved = self.saved;
        self.pos.row = saved.pos.row.min(self.rows.saturating_sub(1));
        self.pos.col = saved.pos.col.min(self.cols.saturating_sub(1));
        self.at_phantom = saved.at_phantom;
        if self.pen != saved.pen {
            self.pen = saved.pen;
            self.pen_dirty = true;
        }
        self.mode
            .set(ModeFlags::CURSOR_VISIBLE, saved.cursor_visible);
        self.mode.set(ModeFlags::CURSOR_BLINK, saved.cursor_blink);
        self.cursor_shape = saved.cursor_shape;
        screen.set_property(Property::CursorVisible(saved.cursor_visible));
        screen.set_property(Property::CursorBlink(saved.cursor_blink));
        screen.set_property(Property::CursorShape(saved.cursor_shape));
    }

    // --- Regions --------------------------------------------------------

    pub(crate) fn set_vertical_margins(&mut self, top: u16, bottom: u16) {
        // 1-based inclusive on the wire, 0-based half-open here.
        let top = top.saturating_sub(1);
        let bottom = bottom.min(self.rows);
        if top >= bottom {
            debug!("invalid scroll region {top}..{bottom}");
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.goto_wire(1, 1);
    }

    pub(crate) fn set_horizontal_margins(&mut self, left: u16, right: u16) {
        let left = left.saturating_sub(1);
        let right = right.min(self.cols);
        if left >= right {
            debug!("invalid left/right margins {left}..{right}");
            return;
        }
        self.scroll_left = left;
        self.scroll_right = right;
        self.goto_wire(1, 1);
    }

    /// The scroll primitive: shift the contents of `rect` by the signed
    /// amounts (positive toward higher rows/columns).
    ///
    /// The sink is offered the whole shift first; if it declines, the same
    /// effect is synthesized with single-cell copies iterated from the edge
    /// the content moves toward, then the vacated strip is erased.
    pub(crate) fn scroll_rect<S: Screen>(
        &mut self,
        screen: &mut S,
        rect: Rect,
        downward: i32,
        rightward: i32,
    ) {
        if rect.is_empty() || (downward == 0 && rightward == 0) {
            return;
        }

        self.flush_pen(screen);

        // Shifting by the full extent or more leaves nothing to copy.
        if downward.unsigned_abs() >= u32::from(rect.rows())
            || rightward.unsigned_abs() >= u32::from(rect.cols())
        {
            screen.erase(rect, &self.pen);
            return;
        }

        if screen.scroll(rect, downward, rightward) {
            return;
        }

        let (dest_row_start, dest_row_end) = if downward >= 0 {
            (rect.start_row + downward as u16, rect.end_row)
        } else {
            (rect.start_row, rect.end_row - downward.unsigned_abs() as u16)
        };
        let (dest_col_start, dest_col_end) = if rightward >= 0 {
            (rect.start_col + rightward as u16, rect.end_col)
        } else {
            (rect.start_col, rect.end_col - rightward.unsigned_abs() as u16)
        };

        for_each_dir(dest_row_start, dest_row_end, downward > 0, |row| {
            let src_row = add_clamped(row, -downward);
            for_each_dir(dest_col_start, dest_col_end, rightward > 0, |col| {
                let src_col = add_clamped(col, -rightward);
                screen.copy_cell(
                    Position::new(row, col),
                    Position::new(src_row, src_col),
                );
            });
        });

        // Erase the strips the shift vacated.
        if downward > 0 {
            screen.erase(
                Rect::new(
                    rect.start_row,
                    dest_row_start,
                    rect.start_col,
                    rect.end_col,
                ),
                &self.pen,
            );
        } else if downward < 0 {
            screen.erase(
                Rect::new(dest_row_end, rect.end_row, rect.start_col, rect.end_col),
                &self.pen,
            );
        }
        if rightward > 0 {
            screen.erase(
                Rect::new(
                    rect.start_row,
                    rect.end_row,
                    rect.start_col,
                    dest_col_start,
                ),
                &self.pen,
            );
        } else if rightward < 0 {
            screen.erase(
                Rect::new(rect.start_row, rect.end_row, dest_col_end, rect.end_col),
                &self.pen,
            );
        }
    }

    // --- Erase ----------------------------------------------------------

    pub(crate) fn erase_rect<S: Screen>(&mut self, screen: &mut S, rect: Rect) {
        if !rect.is_empty() {
            self.flush_pen(screen);
            screen.erase(rect, &self.pen);
        }
    }

    // --- Modes & charsets ----------------------------------------------

    pub(crate) fn set_keypad_application(&mut self, enabled: bool) {
        self.mode.set(ModeFlags::KEYPAD_APPLICATION, enabled);
    }

    pub(crate) fn designate_charset(&mut self, slot: usize, charset: Charset) {
        self.charsets[slot] = charset;
    }

    pub(crate) fn shift_charset(&mut self, slot: usize) {
        self.active_charset = slot;
    }

    /// Alternate screen entry/exit; the erase happens only when the sink
    /// confirms the buffers actually switched.
    pub(crate) fn switch_alt_screen<S: Screen>(
        &mut self,
        screen: &mut S,
        to_alt: bool,
        erase: bool,
    ) {
        if to_alt == self.mode.contains(ModeFlags::ALT_SCREEN) {
            return;
        }
        if !screen.set_mode(ScreenMode::AltScreen, to_alt) {
            return;
        }
        self.mode.set(ModeFlags::ALT_SCREEN, to_alt);
        if to_alt && erase {
            let full = self.full_rect();
            self.erase_rect(screen, full);
        }
    }
}

struct Performer<'a, S: Screen> {
    state: &'a mut State,
    screen: &'a mut S,
}

impl<S: Screen> Actor for Performer<'_, S> {
    fn text(&mut self, bytes: &[u8]) -> usize {
        let old = self.state.pos;
        let consumed = self.state.on_text(bytes, self.screen);
        self.state.update_cursor(self.screen, old);
        consumed
    }

    fn control(&mut self, byte: u8) {
        let old = self.state.pos;
        control::perform(self.state, self.screen, byte);
        self.state.update_cursor(self.screen, old);
    }

    fn escape(&mut self, intermediates: &[u8], byte: u8) {
        let old = self.state.pos;
        esc::perform(self.state, self.screen, intermediates, byte);
        self.state.update_cursor(self.screen, old);
    }

    fn csi(
        &mut self,
        leader: &[u8],
        args: &[tern_vte::CsiArg],
        intermediates: &[u8],
        byte: u8,
    ) {
        let old = self.state.pos;
        csi::perform(self.state, self.screen, leader, args, intermediates, byte);
        self.state.update_cursor(self.screen, old);
    }

    fn osc(&mut self, payload: &[u8]) {
        osc::perform(self.screen, payload);
    }

    fn dcs(&mut self, payload: &[u8]) {
        debug!("unhandled DCS ({} bytes)", payload.len());
    }
}

fn default_tabstops(cols: u16) -> Vec<bool> {
    (0..cols).map(|col| col % TAB_INTERVAL == 0).collect()
}

fn add_clamped(base: u16, delta: i32) -> u16 {
    u16::try_from(i32::from(base) + delta).unwrap_or(if delta < 0 {
        0
    } else {
        u16::MAX
    })
}

fn for_each_dir(start: u16, end: u16, rev: bool, mut f: impl FnMut(u16)) {
    if rev {
        for i in (start..end).rev() {
            f(i);
        }
    } else {
        for i in start..end {
            f(i);
        }
    }
}
