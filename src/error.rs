//! Error taxonomy for decoding, building and grouping topology files.

use thiserror::Error;

/// Fatal decode failure. `offset` is the absolute byte offset in the input
/// where the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("format error at offset {offset:#x}: {reason}")]
pub struct FormatError {
    pub offset: usize,
    pub reason: FormatReason,
}

/// What went wrong while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatReason {
    #[error("truncated input: {what} needs {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("invalid magic: expected CoSA, got {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("unexpected section header size {0} (expected 36)")]
    BadHeaderSize(u32),
    #[error("unknown vendor tuple type {0}")]
    UnknownTupleType(u32),
    #[error("unknown kcontrol type {0}")]
    UnknownKcontrolType(u32),
    #[error("{what}: declared size {declared}, consumed {consumed}")]
    SizeMismatch {
        what: &'static str,
        declared: usize,
        consumed: usize,
    },
    #[error("{0}: string is not valid UTF-8")]
    InvalidString(&'static str),
    #[error("{0} trailing bytes after the last section")]
    TrailingData(usize),
}

impl FormatError {
    pub(crate) fn new(offset: usize, reason: FormatReason) -> Self {
        Self { offset, reason }
    }
}

/// Fatal build failure: the in-memory structure cannot be represented on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{field}: \"{value}\" is longer than {width} bytes")]
    StringTooLong {
        field: &'static str,
        value: String,
        width: usize,
    },
    #[error("{what}: expected {expected} entries, got {actual}")]
    ArrayLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("vendor tuple with token {token} does not match array type {tuple_type:?}")]
    TupleShape {
        token: u32,
        tuple_type: crate::format::TupleType,
    },
    #[error("{what} is too large to encode ({len} bytes)")]
    TooLarge { what: &'static str, len: usize },
}

/// Structural invariant violated after a successful decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("topology contains {0} manifest blocks, expected one")]
    DuplicateManifest(usize),
    #[error("interweaved search from {head}: expected 4 endpoints, found {found:?}")]
    InterweavedEndpoints { head: String, found: Vec<String> },
    #[error("interweaved search from {head}: expected one shared marker, found {found:?}")]
    InterweavedMarker { head: String, found: Vec<String> },
}

/// Crate-level error: anything that can abort processing of one topology file.
#[derive(Debug, Error)]
pub enum TplgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}
