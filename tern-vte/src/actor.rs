//! Callbacks invoked by the sequence parser.
//!
//! The [`Parser`](crate::Parser) walks through a byte stream and reports
//! each recognized unit -- printable text, control bytes, escape sequences,
//! CSI sequences and OSC/DCS string payloads -- to an [`Actor`]
//! implementation. Downstream crates implement this trait to interpret the
//! stream against a terminal model, collect events for inspection, or log
//! traffic without re-implementing the finite state machine.

use crate::csi::CsiArg;

/// Consumer-facing interface for units emitted by the parser.
///
/// Every method has a default implementation so embedders only override the
/// callbacks they care about; an absent callback makes the parser fall back
/// to the encoded default (consume text wholesale, ignore the event).
pub trait Actor {
    /// A run of printable bytes in the active encoding.
    ///
    /// Returns how many bytes were consumed. Returning less than the full
    /// run is the contract for a multi-byte character truncated at the end
    /// of the input: the parser stops there and the unconsumed tail must be
    /// presented again, prefixed to the next input chunk.
    fn text(&mut self, bytes: &[u8]) -> usize {
        bytes.len()
    }

    /// A single-byte C0 control, or a C1 control in its 8-bit or
    /// `ESC`-prefixed 7-bit form (already offset into 0x80..=0x9F).
    fn control(&mut self, _byte: u8) {}

    /// A completed escape sequence: accumulated intermediates plus the
    /// final byte.
    fn escape(&mut self, _intermediates: &[u8], _byte: u8) {}

    /// A completed CSI sequence.
    ///
    /// `leader` holds private-marker bytes (0x3C..=0x3F, e.g. `?`) that
    /// arrived before the first parameter, `intermediates` the bytes in
    /// 0x20..=0x2F that arrived after the parameters.
    fn csi(
        &mut self,
        _leader: &[u8],
        _args: &[CsiArg],
        _intermediates: &[u8],
        _byte: u8,
    ) {
    }

    /// A completed Operating System Command payload.
    fn osc(&mut self, _payload: &[u8]) {}

    /// A completed Device Control String payload, including the command
    /// bytes that preceded the data.
    fn dcs(&mut self, _payload: &[u8]) {}
}
