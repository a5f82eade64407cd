//! Concrete cell grid for the terminal state machine.
//!
//! [`Surface`] registers as the [`tern_state::Screen`] mutation sink and
//! accumulates glyph placements, erases and scrolls into an addressable
//! row-major buffer of [`Cell`]s. It tracks damaged rectangles for
//! incremental repaint and supports plain-text extraction and resize.

mod cell;
mod damage;
mod surface;

pub use cell::{Cell, MAX_CHARS_PER_CELL};
pub use damage::Damage;
pub use surface::Surface;
