use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BloomError>;

/// Field of the serialized layout that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatField {
    Magic,
    Version,
    HashCount,
    BitLength,
    Delimiter,
    Payload,
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatField::Magic => "magic",
            FormatField::Version => "version",
            FormatField::HashCount => "hash function count",
            FormatField::BitLength => "bit array length",
            FormatField::Delimiter => "delimiter",
            FormatField::Payload => "payload",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BloomError {
    #[error(
        "Target probability must be a percentage strictly between 0 and 100, got {value}"
    )]
    InvalidProbability { value: f64 },

    #[error("Computed bit array length is zero for {expected_items} expected items")]
    EmptyBitArray { expected_items: u64 },

    #[error("Bit array length {bits} does not fit the 8-digit length field")]
    BitArrayTooLarge { bits: u64 },

    #[error("Hash reduction requires a non-zero bit array length")]
    ZeroModulus,

    #[error("Bit array lengths differ: {left} != {right}")]
    LengthMismatch { left: u64, right: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid bloom filter {field}: {reason}")]
    Format { field: FormatField, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BloomError {
    pub(crate) fn format(field: FormatField, reason: impl Into<String>) -> Self {
        BloomError::Format {
            field,
            reason: reason.into(),
        }
    }

    /// Invalid construction parameters. The caller must not proceed.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            BloomError::InvalidProbability { .. }
                | BloomError::EmptyBitArray { .. }
                | BloomError::BitArrayTooLarge { .. }
                | BloomError::ZeroModulus
                | BloomError::LengthMismatch { .. }
                | BloomError::InvalidConfig(_)
        )
    }

    /// Malformed serialized input.
    pub fn is_format(&self) -> bool {
        matches!(self, BloomError::Format { .. })
    }

    /// The layout field a format error refers to, if any.
    pub fn format_field(&self) -> Option<FormatField> {
        match self {
            BloomError::Format { field, .. } => Some(*field),
            _ => None,
        }
    }
}
