use log::debug;
use tern_vte::CsiArg;

use crate::color::Color;

/// Underline level applied to subsequent glyphs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

/// The current set of text attributes applied to placed glyphs.
///
/// Pens are plain values compared field-by-field; the state machine keeps
/// one current pen and notifies its screen sink whenever any field changes
/// before the next glyph is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub blink: bool,
    pub reverse: bool,
    pub strike: bool,
    pub underline: Underline,
    /// Font slot 0-9 selected by SGR 10-19.
    pub font: u8,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            bold: false,
            italic: false,
            blink: false,
            reverse: false,
            strike: false,
            underline: Underline::None,
            font: 0,
        }
    }
}

impl Pen {
    /// Interpret an SGR parameter list against this pen.
    ///
    /// This is a pure function of the previous pen value and the argument
    /// list: no other state is read or written, so renderers can evaluate
    /// "what would this do" on a copy. Unrecognized codes are reported and
    /// skipped without aborting the remaining arguments.
    pub fn apply_sgr(&mut self, args: &[CsiArg]) {
        if args.is_empty() {
            *self = Self::default();
            return;
        }

        let mut i = 0;
        while i < args.len() {
            let arg = args[i];

            // A missing parameter defaults to 0, i.e. full reset.
            match arg.or(0) {
                0 => *self = Self::default(),
                1 => self.bold = true,
                3 => self.italic = true,
                4 => {
                    self.underline = if arg.has_subparam() {
                        let style = args.get(i + 1).copied().unwrap_or_default();
                        i += subparam_chain_len(args, i);
                        match style.or(1) {
                            0 => Underline::None,
                            2 => Underline::Double,
                            1 => Underline::Single,
                            other => {
                                debug!("unhandled underline style 4:{other}");
                                Underline::Single
                            },
                        }
                    } else {
                        Underline::Single
                    };
                },
                5 => self.blink = true,
                7 => self.reverse = true,
                9 => self.strike = true,
                font @ 10..=19 => self.font = (font - 10) as u8,
                21 => self.underline = Underline::Double,
                22 => self.bold = false,
                23 => self.italic = false,
                24 => self.underline = Underline::None,
                25 => self.blink = false,
                27 => self.reverse = false,
                29 => self.strike = false,
                index @ 30..=37 => self.fg = Color::Indexed((index - 30) as u8),
                38 => {
                    let (color, extra) = parse_extended_color(&args[i..]);
                    if let Some(color) = color {
                        self.fg = color;
                    }
                    i += extra;
                },
                39 => self.fg = Color::Default,
                index @ 40..=47 => self.bg = Color::Indexed((index - 40) as u8),
                48 => {
                    let (color, extra) = parse_extended_color(&args[i..]);
                    if let Some(color) = color {
                        self.bg = color;
                    }
                    i += extra;
                },
                49 => self.bg = Color::Default,
                index @ 90..=97 => {
                    self.fg = Color::Indexed((index - 90 + 8) as u8);
                },
                index @ 100..=107 => {
                    self.bg = Color::Indexed((index - 100 + 8) as u8);
                },
                other => debug!("unhandled SGR code {other}"),
            }

            i += 1;
        }
    }
}

/// Number of arguments following `args[i]` that belong to its `:` chain.
fn subparam_chain_len(args: &[CsiArg], i: usize) -> usize {
    let mut len = 0;
    while i + len < args.len() && args[i + len].has_subparam() {
        len += 1;
    }
    len
}

/// Parse the `38`/`48` extended color forms.
///
/// `args[0]` is the introducing 38/48. Returns the parsed color and the
/// number of *additional* arguments consumed, covering both the semicolon
/// syntax (`38;5;196`, `38;2;r;g;b`) and the colon syntax with optional
/// colorspace id (`38:5:196`, `38:2:r:g:b`, `38:2::r:g:b`).
fn parse_extended_color(args: &[CsiArg]) -> (Option<Color>, usize) {
    if args[0].has_subparam() {
        let end = subparam_chain_len(args, 0).min(args.len() - 1);
        let chain = &args[1..end + 1];
        let color = match chain.first().map(|sel| sel.or(0)) {
            Some(5) => chain.get(1).and_then(subparam_u8).map(Color::Indexed),
            Some(2) => {
                // With five or more members the second is a colorspace id.
                let rgb = if chain.len() >= 5 { &chain[2..5] } else { chain.get(1..4).unwrap_or(&[]) };
                parse_rgb(rgb)
            },
            _ => None,
        };
        if color.is_none() {
            debug!("malformed extended color {args:?}");
        }
        (color, chain.len())
    } else {
        match args.get(1).map(|sel| sel.or(0)) {
            Some(5) => match args.get(2).and_then(subparam_u8) {
                Some(index) => (Some(Color::Indexed(index)), 2),
                None => (None, args.len() - 1),
            },
            Some(2) if args.len() >= 5 => (parse_rgb(&args[2..5]), 4),
            _ => {
                debug!("malformed extended color {args:?}");
                (None, args.len() - 1)
            },
        }
    }
}

fn subparam_u8(arg: &CsiArg) -> Option<u8> {
    arg.value().and_then(|value| u8::try_from(value).ok())
}

fn parse_rgb(args: &[CsiArg]) -> Option<Color> {
    match args {
        [r, g, b] => Some(Color::Rgb(crate::color::Rgb::new(
            subparam_u8(r)?,
            subparam_u8(g)?,
            subparam_u8(b)?,
        ))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use tern_vte::{Actor, Parser};

    /// Run the SGR arguments of `sequence` through a pen.
    fn apply(pen: &mut Pen, sequence: &str) {
        struct Sgr<'a>(&'a mut Pen);
        impl Actor for Sgr<'_> {
            fn csi(
                &mut self,
                _leader: &[u8],
                args: &[CsiArg],
                _intermediates: &[u8],
                byte: u8,
            ) {
                assert_eq!(byte, b'm');
                self.0.apply_sgr(args);
            }
        }

        Parser::new().feed(sequence.as_bytes(), &mut Sgr(pen));
    }

    #[test]
    fn reset_clears_every_field() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[1;3;4;5;7;9;12;31;42m");
        assert_ne!(pen, Pen::default());

        apply(&mut pen, "\x1b[0m");
        assert_eq!(pen, Pen::default());
    }

    #[test]
    fn missing_parameter_resets() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[1;31m");
        apply(&mut pen, "\x1b[m");
        assert_eq!(pen, Pen::default());
    }

    #[test]
    fn boolean_attributes_set_and_clear() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[1m");
        assert!(pen.bold);
        apply(&mut pen, "\x1b[22m");
        assert!(!pen.bold);

        apply(&mut pen, "\x1b[3;5;7;9m");
        assert!(pen.italic && pen.blink && pen.reverse && pen.strike);
        apply(&mut pen, "\x1b[23;25;27;29m");
        assert!(!pen.italic && !pen.blink && !pen.reverse && !pen.strike);
    }

    #[test]
    fn underline_levels() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[4m");
        assert_eq!(pen.underline, Underline::Single);
        apply(&mut pen, "\x1b[21m");
        assert_eq!(pen.underline, Underline::Double);
        apply(&mut pen, "\x1b[24m");
        assert_eq!(pen.underline, Underline::None);

        apply(&mut pen, "\x1b[4:2m");
        assert_eq!(pen.underline, Underline::Double);
        apply(&mut pen, "\x1b[4:0m");
        assert_eq!(pen.underline, Underline::None);
    }

    #[test]
    fn font_slots() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[17m");
        assert_eq!(pen.font, 7);
        apply(&mut pen, "\x1b[10m");
        assert_eq!(pen.font, 0);
    }

    #[test]
    fn eight_color_and_bright() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[31;44m");
        assert_eq!(pen.fg, Color::Indexed(1));
        assert_eq!(pen.bg, Color::Indexed(4));

        apply(&mut pen, "\x1b[92;103m");
        assert_eq!(pen.fg, Color::Indexed(10));
        assert_eq!(pen.bg, Color::Indexed(11));

        apply(&mut pen, "\x1b[39;49m");
        assert_eq!(pen.fg, Color::Default);
        assert_eq!(pen.bg, Color::Default);
    }

    #[test]
    fn indexed_256_semicolon_form() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[38;5;196;48;5;232m");
        assert_eq!(pen.fg, Color::Indexed(196));
        assert_eq!(pen.bg, Color::Indexed(232));
    }

    #[test]
    fn rgb_semicolon_form() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[38;2;128;64;192m");
        assert_eq!(pen.fg, Color::Rgb(Rgb::new(128, 64, 192)));
    }

    #[test]
    fn colon_forms() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[38:5:100m");
        assert_eq!(pen.fg, Color::Indexed(100));

        apply(&mut pen, "\x1b[38:2:10:20:30m");
        assert_eq!(pen.fg, Color::Rgb(Rgb::new(10, 20, 30)));

        // Colorspace-id variant.
        apply(&mut pen, "\x1b[38:2::40:50:60m");
        assert_eq!(pen.fg, Color::Rgb(Rgb::new(40, 50, 60)));
    }

    #[test]
    fn arguments_after_extended_color_still_apply() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[38;5;12;1m");
        assert_eq!(pen.fg, Color::Indexed(12));
        assert!(pen.bold);

        apply(&mut pen, "\x1b[0;38:2:1:2:3;4m");
        assert_eq!(pen.fg, Color::Rgb(Rgb::new(1, 2, 3)));
        assert_eq!(pen.underline, Underline::Single);
    }

    #[test]
    fn unknown_codes_do_not_abort_processing() {
        let mut pen = Pen::default();
        apply(&mut pen, "\x1b[99;1m");
        assert!(pen.bold);
    }
}
