use thiserror::Error;

/// Errors raised on caller contract violations.
///
/// Nothing in the byte-stream path returns these: malformed input always
/// degrades locally. Only construction and resize with impossible
/// dimensions are rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("terminal size {rows}x{cols} must be at least 1x1")]
    InvalidSize { rows: u16, cols: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
