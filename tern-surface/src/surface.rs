use log::debug;
use tern_state::{
    Pen, Position, Property, Rect, Screen, ScreenMode,
};

use crate::cell::Cell;
use crate::damage::Damage;

/// Row-major cell grid implementing the state machine's mutation sink.
///
/// The surface owns a primary buffer and, when enabled, an alternate
/// buffer that `set_mode(AltScreen)` swaps in; with the alternate buffer
/// disabled the switch is reported as unhandled and the state machine
/// leaves the primary screen alone.
pub struct Surface {
    rows: u16,
    cols: u16,
    cells: Vec<Cell>,
    /// The inactive buffer, present when alternate-screen support is on.
    inactive: Option<Vec<Cell>>,
    alt_active: bool,
    cursor: Position,
    cursor_visible: bool,
    pen: Pen,
    damage: Damage,
    title: Option<String>,
    icon_name: Option<String>,
}

impl Surface {
    pub fn new(rows: u16, cols: u16) -> Self {
        let mut damage = Damage::default();
        damage.push(Rect::new(0, rows, 0, cols));

        Self {
            rows,
            cols,
            cells: blank_buffer(rows, cols),
            inactive: None,
            alt_active: false,
            cursor: Position::default(),
            cursor_visible: true,
            pen: Pen::default(),
            damage,
            title: None,
            icon_name: None,
        }
    }

    /// Allocate (or drop) the alternate screen buffer.
    pub fn enable_alt_screen(&mut self, enabled: bool) {
        if enabled && self.inactive.is_none() {
            self.inactive = Some(blank_buffer(self.rows, self.cols));
        } else if !enabled {
            self.inactive = None;
            self.alt_active = false;
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn icon_name(&self) -> Option<&str> {
        self.icon_name.as_deref()
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if pos.row < self.rows && pos.col < self.cols {
            self.cells.get(self.index(pos))
        } else {
            None
        }
    }

    /// Damage accumulated since the last call.
    pub fn take_damage(&mut self) -> Vec<Rect> {
        self.damage.take()
    }

    /// Extract the text covered by `rect`.
    ///
    /// Erased cells become one space each, but only in front of real
    /// content: trailing erased cells on a row are trimmed, matching how
    /// terminals display blank line ends. Rows are joined with `\n`;
    /// continuation cells of wide glyphs contribute nothing.
    pub fn text(&self, rect: Rect) -> String {
        debug_assert!(
            rect.end_row <= self.rows && rect.end_col <= self.cols,
            "text() rect {rect} outside {}x{}",
            self.rows,
            self.cols,
        );

        let mut out = String::new();
        for row in rect.start_row..rect.end_row.min(self.rows) {
            if row > rect.start_row {
                out.push('\n');
            }

            let mut pending_blanks = 0usize;
            for col in rect.start_col..rect.end_col.min(self.cols) {
                let cell = &self.cells[self.index(Position::new(row, col))];
                if cell.is_continuation() {
                    continue;
                }
                if cell.is_erased() {
                    pending_blanks += 1;
                    continue;
                }

                out.extend(std::iter::repeat_n(' ', pending_blanks));
                pending_blanks = 0;
                out.extend(cell.chars());
            }
        }
        out
    }

    /// The whole screen as text.
    pub fn screen_text(&self) -> String {
        self.text(Rect::new(0, self.rows, 0, self.cols))
    }

    fn index(&self, pos: Position) -> usize {
        usize::from(pos.row) * usize::from(self.cols) + usize::from(pos.col)
    }

    fn fill(&mut self, rect: Rect, pen: &Pen) {
        for row in rect.start_row..rect.end_row.min(self.rows) {
            for col in rect.start_col..rect.end_col.min(self.cols) {
                let index = self.index(Position::new(row, col));
                self.cells[index] = Cell::erased(*pen);
            }
        }
    }
}

impl Screen for Surface {
    fn put_glyph(&mut self, chars: &[char], width: u8, pos: Position, pen: &Pen) {
        if pos.row >= self.rows || pos.col >= self.cols {
            debug!("glyph at {pos} outside {}x{}", self.rows, self.cols);
            return;
        }

        let index = self.index(pos);
        self.cells[index] = Cell::glyph(chars, width, *pen);

        // Trailing cells of a wide glyph hold no independent text.
        let end = (pos.col + u16::from(width)).min(self.cols);
        for col in pos.col + 1..end {
            let index = self.index(Position::new(pos.row, col));
            self.cells[index] = Cell::continuation(*pen);
        }

        self.damage
            .push(Rect::new(pos.row, pos.row + 1, pos.col, end));
    }

    fn move_cursor(&mut self, new: Position, old: Position, visible: bool) {
        self.cursor = new;
        self.cursor_visible = visible;
        // The renderer repaints both cells to move the cursor image.
        self.damage
            .push(Rect::new(old.row, old.row + 1, old.col, old.col + 1));
        self.damage
            .push(Rect::new(new.row, new.row + 1, new.col, new.col + 1));
    }

    fn scroll(&mut self, rect: Rect, downward: i32, rightward: i32) -> bool {
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

        // Walk from the edge the content moves toward so every source is
        // read before it is overwritten.
        let rows: Vec<u16> = if downward > 0 {
            (dest_row_start..dest_row_end).rev().collect()
        } else {
            (dest_row_start..dest_row_end).collect()
        };
        let cols: Vec<u16> = if rightward > 0 {
            (dest_col_start..dest_col_end).rev().collect()
        } else {
            (dest_col_start..dest_col_end).collect()
        };

        for &row in &rows {
            let src_row = (i32::from(row) - downward) as u16;
            for &col in &cols {
                let src_col = (i32::from(col) - rightward) as u16;
                let src = self.index(Position::new(src_row, src_col));
                let dest = self.index(Position::new(row, col));
                self.cells[dest] = self.cells[src].clone();
            }
        }

        // Erase the vacated strips with the current pen.
        let pen = self.pen;
        if downward > 0 {
            self.fill(
                Rect::new(rect.start_row, dest_row_start, rect.start_col, rect.end_col),
                &pen,
            );
        } else if downward < 0 {
            self.fill(
                Rect::new(dest_row_end, rect.end_row, rect.start_col, rect.end_col),
                &pen,
            );
        }
        if rightward > 0 {
            self.fill(
                Rect::new(rect.start_row, rect.end_row, rect.start_col, dest_col_start),
                &pen,
            );
        } else if rightward < 0 {
            self.fill(
                Rect::new(rect.start_row, rect.end_row, dest_col_end, rect.end_col),
                &pen,
            );
        }

        self.damage.push(rect);
        true
    }

    fn copy_cell(&mut self, dest: Position, src: Position) {
        if dest.row >= self.rows
            || dest.col >= self.cols
            || src.row >= self.rows
            || src.col >= self.cols
        {
            debug!("copy {src} -> {dest} outside {}x{}", self.rows, self.cols);
            return;
        }
        let src_index = self.index(src);
        let dest_index = self.index(dest);
        self.cells[dest_index] = self.cells[src_index].clone();
        self.damage
            .push(Rect::new(dest.row, dest.row + 1, dest.col, dest.col + 1));
    }

    fn erase(&mut self, rect: Rect, pen: &Pen) {
        self.fill(rect, pen);
        self.damage.push(rect);
    }

    fn set_pen(&mut self, pen: &Pen) {
        self.pen = *pen;
    }

    fn set_mode(&mut self, mode: ScreenMode, value: bool) -> bool {
        match mode {
            ScreenMode::AltScreen => {
                let Some(inactive) = &mut self.inactive else {
                    return false;
                };
                if value != self.alt_active {
                    std::mem::swap(&mut self.cells, inactive);
                    self.alt_active = value;
                    self.damage.push(Rect::new(0, self.rows, 0, self.cols));
                }
                true
            },
            ScreenMode::ReverseVideo => false,
        }
    }

    fn set_property(&mut self, prop: Property<'_>) {
        match prop {
            Property::Title(title) => self.title = Some(title.to_owned()),
            Property::IconName(name) => self.icon_name = Some(name.to_owned()),
            Property::CursorVisible(visible) => self.cursor_visible = visible,
            _ => {},
        }
    }

    /// Re-allocate for the new extent, keeping the overlapping top-left
    /// region. Growth is reported as damage (new rows, new columns);
    /// shrinking silently drops content outside the new bounds.
    fn resize(&mut self, rows: u16, cols: u16) {
        if rows == self.rows && cols == self.cols {
            return;
        }

        self.cells = resize_buffer(&self.cells, self.rows, self.cols, rows, cols);
        if let Some(inactive) = &self.inactive {
            self.inactive =
                Some(resize_buffer(inactive, self.rows, self.cols, rows, cols));
        }

        if rows > self.rows {
            self.damage.push(Rect::new(self.rows, rows, 0, cols));
        }
        if cols > self.cols {
            self.damage.push(Rect::new(0, rows.min(self.rows), self.cols, cols));
        }

        self.rows = rows;
        self.cols = cols;
        self.cursor.row = self.cursor.row.min(rows.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(cols.saturating_sub(1));
    }
}

fn blank_buffer(rows: u16, cols: u16) -> Vec<Cell> {
    vec![Cell::default(); usize::from(rows) * usize::from(cols)]
}

fn resize_buffer(
    cells: &[Cell],
    old_rows: u16,
    old_cols: u16,
    rows: u16,
    cols: u16,
) -> Vec<Cell> {
    let mut next = blank_buffer(rows, cols);
    for row in 0..rows.min(old_rows) {
        for col in 0..cols.min(old_cols) {
            let old_index =
                usize::from(row) * usize::from(old_cols) + usize::from(col);
            let new_index = usize::from(row) * usize::from(cols) + usize::from(col);
            next[new_index] = cells[old_index].clone();
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_state::State;
    use tern_vte::Parser;

    struct Term {
        parser: Parser,
        state: State,
        surface: Surface,
    }

    impl Term {
        fn new(rows: u16, cols: u16) -> Self {
            Self {
                parser: Parser::new(),
                state: State::new(rows, cols),
                surface: Surface::new(rows, cols),
            }
        }

        fn feed(&mut self, bytes: &[u8]) {
            self.state
                .advance(&mut self.parser, bytes, &mut self.surface);
        }
    }

    #[test]
    fn text_round_trips_through_the_grid() {
        let mut term = Term::new(3, 10);
        term.feed(b"hi there\r\nsecond");
        assert_eq!(term.surface.screen_text(), "hi there\nsecond\n");
    }

    #[test]
    fn erased_cells_pad_only_before_content() {
        let mut term = Term::new(2, 10);
        term.feed(b"\x1b[1;5Hx");
        // Four erased cells in front of the glyph, none behind it.
        assert_eq!(term.surface.screen_text(), "    x\n");
    }

    #[test]
    fn wide_glyphs_occupy_continuations() {
        let mut term = Term::new(1, 6);
        term.feed("你a".as_bytes());
        let lead = term.surface.cell(Position::new(0, 0)).unwrap();
        assert_eq!(lead.chars(), &['你']);
        assert_eq!(lead.width(), 2);
        assert!(
            term.surface
                .cell(Position::new(0, 1))
                .unwrap()
                .is_continuation()
        );
        assert_eq!(term.surface.screen_text(), "你a");
    }

    #[test]
    fn line_feed_at_bottom_scrolls_content_up() {
        let mut term = Term::new(3, 10);
        term.feed(b"one\r\ntwo\r\nthree");
        term.feed(b"\r\nfour");
        assert_eq!(term.surface.screen_text(), "two\nthree\nfour");
    }

    #[test]
    fn delete_line_shifts_rows_up() {
        let mut term = Term::new(4, 10);
        term.feed(b"A\r\nB\r\nB\r\nC");
        term.feed(b"\x1b[2;1H\x1b[M");
        assert_eq!(term.surface.screen_text(), "A\nB\nC\n");
    }

    #[test]
    fn insert_chars_shift_the_tail_right() {
        let mut term = Term::new(1, 10);
        term.feed(b"abcd\x1b[1;2H\x1b[2@");
        assert_eq!(term.surface.screen_text(), "a  bcd");
    }

    #[test]
    fn erase_display_clears_cells() {
        let mut term = Term::new(2, 10);
        term.feed(b"hello\r\nworld\x1b[H\x1b[2J");
        assert_eq!(term.surface.screen_text(), "\n");
    }

    #[test]
    fn cursor_tracks_state_machine() {
        let mut term = Term::new(5, 10);
        term.feed(b"abc\x1b[2;4H");
        assert_eq!(term.surface.cursor(), Position::new(1, 3));
        term.feed(b"\x1b[?25l");
        assert!(!term.surface.cursor_visible());
    }

    #[test]
    fn title_property_lands_on_the_surface() {
        let mut term = Term::new(2, 10);
        term.feed(b"\x1b]2;my title\x07");
        assert_eq!(term.surface.title(), Some("my title"));
        assert_eq!(term.surface.icon_name(), None);

        term.feed(b"\x1b]0;both\x07");
        assert_eq!(term.surface.title(), Some("both"));
        assert_eq!(term.surface.icon_name(), Some("both"));
    }

    #[test]
    fn damage_accumulates_and_drains() {
        let mut term = Term::new(2, 10);
        term.surface.take_damage();
        term.feed(b"hi");
        let damage = term.surface.take_damage();
        assert!(!damage.is_empty());
        assert!(damage.iter().any(|r| r.contains(Position::new(0, 0))));
        assert!(term.surface.take_damage().is_empty());
    }

    #[test]
    fn resize_growth_reports_two_rects() {
        let mut surface = Surface::new(4, 10);
        surface.take_damage();
        surface.resize(6, 12);
        let damage = surface.take_damage();
        assert!(damage.contains(&Rect::new(4, 6, 0, 12)));
        assert!(damage.contains(&Rect::new(0, 4, 10, 12)));
    }

    #[test]
    fn resize_keeps_the_overlap_and_drops_the_rest() {
        let mut term = Term::new(3, 10);
        term.feed(b"abcdef\r\nsecond\r\nthird");
        term.surface.resize(2, 4);
        assert_eq!(term.surface.screen_text(), "abcd\nseco");
    }

    #[test]
    fn alt_screen_swap_preserves_primary_content() {
        let mut term = Term::new(2, 10);
        term.surface.enable_alt_screen(true);
        term.feed(b"primary");
        term.feed(b"\x1b[?1049h");
        assert_eq!(term.surface.screen_text(), "\n");

        term.feed(b"alt text");
        term.feed(b"\x1b[?1049l");
        assert_eq!(term.surface.screen_text(), "primary\n");
    }

    #[test]
    fn alt_screen_unhandled_without_buffer() {
        let mut term = Term::new(2, 10);
        term.feed(b"primary\x1b[?1049h");
        // No alternate buffer: the switch is declined and nothing is
        // erased.
        assert_eq!(term.surface.screen_text(), "primary\n");
    }
}
