//! Unified error types for the hyperstack library.
//!
//! Both halves of the crate report through the same [`Error`] enum: the block
//! readers of the binary stack format and the script grammar.
use thiserror::Error;

/// Main error type for hyperstack operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read went past the end of a block or buffer
    #[error("Out of range: read of {width} bytes at offset {offset} in a range of {length} bytes")]
    OutOfRange {
        offset: usize,
        width: usize,
        length: usize,
    },

    /// A block carries a kind name the reader does not know
    #[error("Unknown block kind: {0}")]
    UnknownBlockKind(String),

    /// A block referenced by another one is not in the master directory
    #[error("Block {kind} with identifier {identifier} not found")]
    MissingBlock { kind: String, identifier: i32 },

    /// A stored checksum does not match the recomputed one
    #[error("Integrity warning in {block} block: stored checksum {stored:#010x}, computed {computed:#010x}")]
    IntegrityWarning {
        block: &'static str,
        stored: u32,
        computed: u32,
    },

    /// The stack is private and no password was given
    #[error("A password is required to open this stack")]
    MissingPassword,

    /// The given password does not decrypt the stack header
    #[error("Wrong password")]
    WrongPassword,

    /// The data is not a stack file
    #[error("Not a stack file")]
    NotAStack,

    /// Corrupted or malformed file
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// The stack format number is not one the reader supports
    #[error("Unsupported stack format: {0}")]
    UnsupportedVersion(u32),

    /// The grammar did not recognize the input
    #[error("Parse error at token {position}: {message}")]
    ParseError { position: usize, message: String },

    /// A lazy field was read while its own producer was running
    #[error("Recursive evaluation of a lazy field")]
    RecursiveEvaluation,

    /// Grammar recursion went past the configured ceiling
    #[error("Grammar recursion deeper than {depth} levels")]
    GrammarTooDeep { depth: usize },

    /// A semantic action asked for a sub-match of the wrong type
    #[error("Schema '{schema}' produced a sub-match of an unexpected type")]
    CaptureMismatch { schema: String },
}

impl Error {
    /// Whether the error only reports a broken invariant and decoding may go on.
    #[inline]
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::IntegrityWarning { .. })
    }
}

/// Result type for hyperstack operations.
pub type Result<T> = std::result::Result<T, Error>;
