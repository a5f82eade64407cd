use std::fmt::{self, Display, Formatter};

/// A pen color: the terminal default for the slot it sits in, an indexed
/// palette entry, or a direct RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(Rgb),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Resolution of indexed colors to concrete RGB values.
///
/// The 256-color space is the standard xterm layout: 16 ANSI/high-intensity
/// entries, a 6x6x6 cube over a gamma-corrected ramp, and a 24-step
/// greyscale ramp.
pub mod palette {
    use super::{Color, Rgb};

    /// The 16 ANSI colors (normal + high intensity).
    pub static ANSI: [Rgb; 16] = [
        Rgb::new(0, 0, 0),
        Rgb::new(224, 0, 0),
        Rgb::new(0, 224, 0),
        Rgb::new(224, 224, 0),
        Rgb::new(0, 0, 224),
        Rgb::new(224, 0, 224),
        Rgb::new(0, 224, 224),
        Rgb::new(224, 224, 224),
        Rgb::new(128, 128, 128),
        Rgb::new(255, 64, 64),
        Rgb::new(64, 255, 64),
        Rgb::new(255, 255, 64),
        Rgb::new(64, 64, 255),
        Rgb::new(255, 64, 255),
        Rgb::new(64, 255, 255),
        Rgb::new(255, 255, 255),
    ];

    /// Channel values of the 6-step color cube axis.
    static CUBE_RAMP: [u8; 6] = [0, 95, 135, 175, 215, 255];

    /// Resolve a 256-color palette index.
    pub fn indexed(index: u8) -> Rgb {
        match index {
            0..=15 => ANSI[index as usize],
            16..=231 => {
                let index = index as usize - 16;
                Rgb::new(
                    CUBE_RAMP[index / 36],
                    CUBE_RAMP[(index / 6) % 6],
                    CUBE_RAMP[index % 6],
                )
            },
            232..=255 => {
                let level = 8 + 10 * (index - 232);
                Rgb::new(level, level, level)
            },
        }
    }

    /// Resolve any pen color to RGB. `foreground` picks the default for
    /// the slot the color sits in.
    pub fn resolve(color: Color, foreground: bool) -> Rgb {
        match color {
            Color::Default if foreground => ANSI[7],
            Color::Default => ANSI[0],
            Color::Indexed(index) => indexed(index),
            Color::Rgb(rgb) => rgb,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ansi_range_uses_static_table() {
            assert_eq!(indexed(1), Rgb::new(224, 0, 0));
            assert_eq!(indexed(15), Rgb::new(255, 255, 255));
        }

        #[test]
        fn cube_corners() {
            assert_eq!(indexed(16), Rgb::new(0, 0, 0));
            assert_eq!(indexed(231), Rgb::new(255, 255, 255));
            // 16 + 36*1 + 6*2 + 3 => (95, 135, 175)
            assert_eq!(indexed(16 + 36 + 12 + 3), Rgb::new(95, 135, 175));
        }

        #[test]
        fn greyscale_ramp() {
            assert_eq!(indexed(232), Rgb::new(8, 8, 8));
            assert_eq!(indexed(255), Rgb::new(238, 238, 238));
        }
    }
}
