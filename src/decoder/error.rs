use thiserror::Error;

/// Broad class of a decode failure.
///
/// Every variant of [`DecodeError`] falls into exactly one class; callers that
/// only care whether a symbol is readable can treat them all alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller handed over an unusable image or corner set
    InvalidInput,
    /// Pixel runs could not be turned into codewords
    Geometry,
    /// Row indicators or codeword counts do not agree
    Consistency,
    /// Damage exceeds what error correction can recover
    Capacity,
    /// Corrected codewords do not form a valid compaction stream
    Bitstream,
}

/// Errors produced while decoding a PDF417 symbol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Image has no pixels
    #[error("invalid image: {0}")]
    InvalidImage(&'static str),

    /// A corner coordinate is NaN or infinite
    #[error("corner point ({0}, {1}) is not finite")]
    NonFiniteCorner(f32, f32),

    /// Corners are missing or lie outside the image
    #[error("corner points do not describe a bounding box")]
    InvalidCorners,

    /// No start or stop pattern next to the corners
    #[error("could not measure the codeword width next to the corners")]
    CodewordWidth,

    /// Row indicators disagree on rows, columns or EC level
    #[error("no row indicator column produced consistent metadata")]
    NoMetadata,

    /// Symbol length descriptor does not fit the symbol
    #[error("codeword count {0} is outside the symbol capacity")]
    CodewordCount(usize),

    /// More unreadable codewords than error correction can absorb
    #[error("{erasures} erasures exceed the capacity of {ec_codewords} error correction codewords")]
    TooManyErasures {
        /// Erased codeword count
        erasures: usize,
        /// Error correction codewords in the symbol
        ec_codewords: usize,
    },

    /// Reed-Solomon decoding failed
    #[error("error correction failed: {0}")]
    Checksum(&'static str),

    /// Every tried combination of ambiguous codewords failed
    #[error("no ambiguous codeword combination corrected after {0} attempts")]
    AmbiguityExhausted(usize),

    /// Codeword stream violates the compaction rules
    #[error("malformed codeword stream: {0}")]
    Format(&'static str),

    /// ECI designator without a known character set
    #[error("unsupported ECI designator {0}")]
    UnsupportedEci(u32),
}

impl DecodeError {
    /// Failure class of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            DecodeError::InvalidImage(_) | DecodeError::NonFiniteCorner(..) => {
                FailureKind::InvalidInput
            }
            DecodeError::InvalidCorners | DecodeError::CodewordWidth => FailureKind::Geometry,
            DecodeError::NoMetadata | DecodeError::CodewordCount(_) => FailureKind::Consistency,
            DecodeError::TooManyErasures { .. }
            | DecodeError::Checksum(_)
            | DecodeError::AmbiguityExhausted(_) => FailureKind::Capacity,
            DecodeError::Format(_) | DecodeError::UnsupportedEci(_) => FailureKind::Bitstream,
        }
    }
}
