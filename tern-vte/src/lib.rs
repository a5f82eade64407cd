//! Resumable byte-at-a-time parser for the ECMA-48 / DEC VT control
//! sequence grammar.
//!
//! [`Parser::feed`] accepts arbitrary byte slices, including ones that stop
//! in the middle of a sequence, and reports recognized units to an
//! [`Actor`]. State for an unfinished sequence is kept inside the parser so
//! the next call resumes exactly where the previous one stopped.

pub mod encoding;

mod actor;
mod csi;
mod parser;

pub use actor::Actor;
pub use csi::CsiArg;
pub use parser::Parser;
