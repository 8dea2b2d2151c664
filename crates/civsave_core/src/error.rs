use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("truncated save file: missing 00 00 FF FF end-of-file marker")]
    TruncatedFile,

    #[error("no save file header found: expected CIV5 or CIVBE magic")]
    UnrecognizedFormat,

    #[error(
        "secondary player status did not validate for slot {slot}: primary {primary}, secondary {secondary}"
    )]
    StatusMismatch {
        slot: usize,
        primary: u32,
        secondary: u32,
    },

    #[error("chunk {ordinal} not found: file has {available} chunks")]
    ChunkNotFound { ordinal: usize, available: usize },

    #[error("could not find position {position} in chunk {ordinal}")]
    PositionNotFound { ordinal: usize, position: usize },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("edit would write a chunk delimiter at offset {offset:#x}")]
    DelimiterCollision { offset: usize },

    #[error("encoded string is {len} bytes, longer than the {max} byte limit")]
    StringTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, SaveError>;
