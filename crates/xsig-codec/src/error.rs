use std::fmt;

use crate::kind::SignalKind;

/// The bit-level rule a malformed frame broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The byte cannot start any frame.
    UnknownLeadByte(u8),
    /// The lead byte does not carry the pattern of the kind being decoded.
    LeadPattern { kind: SignalKind, byte: u8 },
    /// A byte that must be a continuation byte has its MSB set.
    HighBitSet { offset: usize, byte: u8 },
    /// A serial payload contains the sentinel before its final byte.
    EmbeddedSentinel { offset: usize },
    /// The sentinel arrived where the serial index byte belongs.
    EarlySentinel,
    /// No sentinel within the configured serial frame limit.
    UnterminatedSerial { scanned: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLeadByte(byte) => write!(f, "byte {byte:#04x} cannot start a frame"),
            Self::LeadPattern { kind, byte } => {
                write!(f, "lead byte {byte:#04x} is not a {kind} lead byte")
            }
            Self::HighBitSet { offset, byte } => {
                write!(f, "byte {byte:#04x} at offset {offset} has its high bit set")
            }
            Self::EmbeddedSentinel { offset } => {
                write!(f, "serial payload contains 0xff at offset {offset}")
            }
            Self::EarlySentinel => f.write_str("serial frame terminated inside its header"),
            Self::UnterminatedSerial { scanned } => {
                write!(f, "no serial terminator within {scanned} bytes")
            }
        }
    }
}

/// Errors that can occur while encoding or decoding XSIG signals.
#[derive(Debug, thiserror::Error)]
pub enum XsigError {
    /// The signal index does not fit the kind's address space.
    #[error("{kind} index {index} out of range (max {max})")]
    IndexOutOfRange {
        kind: SignalKind,
        index: u16,
        max: u16,
    },

    /// The serial payload exceeds the wire limit.
    #[error("serial payload too long ({len} bytes, max {max})")]
    SerialTooLong { len: usize, max: usize },

    /// The serial payload contains the reserved terminator byte.
    #[error("serial payload contains reserved byte 0xff at offset {offset}")]
    InvalidSerialByte { offset: usize },

    /// The buffer holds fewer bytes than the kind requires.
    #[error("short buffer ({available} bytes, need {needed})")]
    ShortBuffer { needed: usize, available: usize },

    /// The bytes break the kind's bit layout.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(Violation),

    /// The stream ended cleanly on a frame boundary.
    #[error("end of stream")]
    EndOfStream,

    /// The stream ended partway through a frame.
    #[error("stream closed after {received} bytes of a {kind} frame")]
    Truncated { kind: SignalKind, received: usize },

    /// An I/O error occurred on the underlying byte source or sink.
    #[error("xsig I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl XsigError {
    /// The violation behind an `InvalidEncoding` error.
    pub fn violation(&self) -> Option<Violation> {
        match self {
            Self::InvalidEncoding(violation) => Some(*violation),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, XsigError>;
