//! Terminal state machine.
//!
//! [`State`] consumes the parse events produced by [`tern_vte::Parser`] and
//! interprets them against cursor position, scroll regions, mode flags and
//! the current [`Pen`], emitting screen mutations to a [`Screen`]
//! implementation. It owns no cell storage itself; a grid such as
//! `tern-surface`'s, or an embedding renderer, registers as the [`Screen`]
//! sink and accumulates the mutations.

mod color;
mod control;
mod csi;
mod esc;
mod index;
mod mode;
mod osc;
mod pen;
mod screen;
mod state;

pub use color::{Color, Rgb, palette};
pub use index::{Position, Rect};
pub use mode::{ModeFlags, MouseEncoding, MouseProtocol};
pub use pen::{Pen, Underline};
pub use screen::{CursorShape, Property, Screen, ScreenMode};
pub use state::State;
