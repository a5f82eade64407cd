use tern::{KeyCode, Modifiers, Position, Rect, Terminal};

#[test]
fn build_rejects_zero_sizes() {
    assert!(Terminal::new(0, 80).is_err());
    assert!(Terminal::new(25, 0).is_err());
    assert!(Terminal::new(1, 1).is_ok());
}

#[test]
fn delete_line_scenario() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.feed(b"A\r\nB\r\nB\r\nC");
    // Move to the second row and delete it once.
    term.feed(b"\x1b[2;1H\x1b[M");

    let text = term.surface().text(Rect::new(0, 4, 0, 80));
    assert_eq!(text, "A\nB\nC\n");
}

#[test]
fn split_feeding_is_transparent() {
    let input: &[u8] =
        "first\r\n\x1b[1;33msecond\x1b[0m\r\n\x1b[2;3Hé你\x1b]2;t\x07".as_bytes();

    let mut whole = Terminal::new(10, 40).unwrap();
    whole.feed(input);
    let expected = whole.surface().screen_text();

    for split in 0..=input.len() {
        let mut term = Terminal::new(10, 40).unwrap();
        term.feed(&input[..split]);
        term.feed(&input[split..]);
        assert_eq!(
            term.surface().screen_text(),
            expected,
            "split at {split}"
        );
        assert_eq!(term.surface().title(), Some("t"), "split at {split}");
    }
}

#[test]
fn byte_at_a_time_feeding() {
    let input = "x\x1b[5;5H\x1b[31mfoo\x1b[K".as_bytes();

    let mut whole = Terminal::new(10, 40).unwrap();
    whole.feed(input);

    let mut dribble = Terminal::new(10, 40).unwrap();
    for &byte in input {
        dribble.feed(&[byte]);
    }

    assert_eq!(
        dribble.surface().screen_text(),
        whole.surface().screen_text()
    );
    assert_eq!(dribble.state().cursor(), whole.state().cursor());
}

#[test]
fn utf8_split_across_feeds() {
    let mut term = Terminal::new(2, 10).unwrap();
    let bytes = "héllo".as_bytes();
    // Split inside the two-byte é.
    term.feed(&bytes[..2]);
    term.feed(&bytes[2..]);
    assert_eq!(term.surface().screen_text(), "héllo\n");
}

#[test]
fn scroll_region_isolates_rows() {
    let mut term = Terminal::new(25, 80).unwrap();
    // Mark a row outside the region.
    term.feed(b"\x1b[12;1Hkeep me");
    // Region rows 1-10, then enough line feeds to scroll it.
    term.feed(b"\x1b[1;10r\x1b[1;1H");
    for _ in 0..12 {
        term.feed(b"\n");
    }
    assert_eq!(term.state().cursor(), Position::new(9, 0));

    let outside = term.surface().text(Rect::new(11, 12, 0, 80));
    assert_eq!(outside, "keep me");
}

#[test]
fn cursor_key_encoding_follows_application_mode() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.key(KeyCode::Up, Modifiers::empty());
    assert_eq!(term.take_output(), b"\x1b[A");

    // The application switches cursor-key mode on.
    term.feed(b"\x1b[?1h");
    term.key(KeyCode::Up, Modifiers::empty());
    assert_eq!(term.take_output(), b"\x1bOA");
}

#[test]
fn keypad_mode_set_by_escape() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.feed(b"\x1b=");
    term.key(KeyCode::Keypad(tern::KeypadKey::Digit(0)), Modifiers::empty());
    assert_eq!(term.take_output(), b"\x1bOp");

    term.feed(b"\x1b>");
    term.key(KeyCode::Keypad(tern::KeypadKey::Digit(0)), Modifiers::empty());
    assert_eq!(term.take_output(), b"0");
}

#[test]
fn mouse_reports_only_when_enabled() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.mouse_button(1, true, Modifiers::empty());
    assert!(term.output().is_empty());

    term.feed(b"\x1b[?1000h\x1b[?1006h");
    term.mouse_move(Position::new(4, 9), Modifiers::empty());
    assert!(term.output().is_empty(), "click mode reports no motion");

    term.mouse_button(1, true, Modifiers::empty());
    assert_eq!(term.take_output(), b"\x1b[<0;10;5M");
    term.mouse_button(1, false, Modifiers::empty());
    assert_eq!(term.take_output(), b"\x1b[<0;10;5m");
}

#[test]
fn drag_mode_reports_held_motion() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.feed(b"\x1b[?1002h\x1b[?1006h");

    term.mouse_move(Position::new(0, 1), Modifiers::empty());
    assert!(term.output().is_empty(), "no button held");

    term.mouse_button(1, true, Modifiers::empty());
    term.take_output();
    term.mouse_move(Position::new(0, 2), Modifiers::empty());
    assert_eq!(term.take_output(), b"\x1b[<32;3;1M");
}

#[test]
fn bracketed_paste_wraps_only_when_enabled() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.paste_start();
    term.paste_end();
    assert!(term.output().is_empty());

    term.feed(b"\x1b[?2004h");
    term.paste_start();
    term.paste_end();
    assert_eq!(term.take_output(), b"\x1b[200~\x1b[201~");
}

#[test]
fn focus_reports_when_requested() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.focus(true);
    assert!(term.output().is_empty());

    term.feed(b"\x1b[?1004h");
    term.focus(true);
    term.focus(false);
    assert_eq!(term.take_output(), b"\x1b[I\x1b[O");
}

#[test]
fn output_queue_drains_incrementally() {
    let mut term = Terminal::new(25, 80).unwrap();
    term.key(KeyCode::Char('h'), Modifiers::empty());
    term.key(KeyCode::Char('i'), Modifiers::empty());

    let mut buf = [0u8; 1];
    assert_eq!(term.read_output(&mut buf), 1);
    assert_eq!(&buf, b"h");
    assert_eq!(term.output(), b"i");
    assert_eq!(term.read_output(&mut buf), 1);
    assert_eq!(&buf, b"i");
    assert_eq!(term.read_output(&mut buf), 0);
}

#[test]
fn resize_reflows_surface_and_state() {
    let mut term = Terminal::new(4, 10).unwrap();
    term.feed(b"abcdef\r\nsecond");
    term.surface_mut().take_damage();

    term.resize(6, 12).unwrap();
    assert_eq!(term.size(), (6, 12));
    let damage = term.surface_mut().take_damage();
    assert!(damage.contains(&Rect::new(4, 6, 0, 12)));
    assert!(damage.contains(&Rect::new(0, 4, 10, 12)));

    assert!(term.resize(0, 12).is_err());
}

#[test]
fn full_reset_restores_defaults() {
    let mut term = Terminal::new(4, 10).unwrap();
    term.feed(b"junk\x1b[?1h\x1b[31m\x1b[2;5r");
    term.feed(b"\x1bc");

    assert_eq!(term.surface().screen_text(), "\n\n\n");
    assert_eq!(term.state().cursor(), Position::new(0, 0));
    assert!(!term.state().mode().contains(tern::ModeFlags::CURSOR_KEYS));
    assert_eq!(*term.state().pen(), tern::Pen::default());
}

#[test]
fn external_screen_sink_receives_mutations() {
    use tern::{Pen, Screen};

    #[derive(Default)]
    struct Glyphs(Vec<(char, Position)>);

    impl Screen for Glyphs {
        fn put_glyph(
            &mut self,
            chars: &[char],
            _width: u8,
            pos: Position,
            _pen: &Pen,
        ) {
            self.0.push((chars[0], pos));
        }
    }

    let mut term = Terminal::with_screen(5, 10, Glyphs::default()).unwrap();
    term.feed(b"ok");
    assert_eq!(
        term.screen().0,
        vec![('o', Position::new(0, 0)), ('k', Position::new(0, 1))]
    );
}
