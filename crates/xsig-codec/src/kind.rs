//! Wire layout constants and lead-byte classification.
//!
//! Every frame starts with a lead byte whose prefix bits select its kind.
//! Patterns nest, so classification checks them in a fixed order:
//!
//! ```text
//! 0xFC              clear opcode
//! 0xFD              refresh opcode
//! 10cx xxxx         digital   (mask 0xC0 == 0x80)
//! 11vv 0xxx         analog    (mask 0xC8 == 0xC0)
//! 1100 1xxx         serial    (mask 0xF8 == 0xC8)
//! ```
//!
//! Bytes after the lead byte of a fixed frame (and the serial index byte)
//! are continuation bytes and always have their MSB clear.

use std::fmt;

/// Opcode byte for a clear operation.
pub const CLEAR_OPCODE: u8 = 0xFC;

/// Opcode byte for a refresh operation.
pub const REFRESH_OPCODE: u8 = 0xFD;

/// Terminator of a serial transition. Never valid inside a serial payload.
pub const SENTINEL: u8 = 0xFF;

/// Continuation bytes carry seven bits; the MSB must be clear.
pub const CONTINUATION_MASK: u8 = 0x80;

/// Low seven bits of a continuation byte.
pub const LOW7: u8 = 0x7F;

/// Digital lead byte: `10cx xxxx`.
pub const DIGITAL_MASK: u8 = 0xC0;
pub const DIGITAL_PATTERN: u8 = 0x80;
/// Set when the digital value is `false`.
pub const DIGITAL_COMPLEMENT: u8 = 0x20;
/// Index bits 11-7 in the digital lead byte.
pub const DIGITAL_INDEX_HIGH: u8 = 0x1F;

/// Analog lead byte: `11vv 0xxx`.
pub const ANALOG_MASK: u8 = 0xC8;
pub const ANALOG_PATTERN: u8 = 0xC0;
/// Value bits 15-14 in the analog lead byte.
pub const ANALOG_VALUE_HIGH: u8 = 0x30;
pub const ANALOG_VALUE_HIGH_SHIFT: u32 = 4;

/// Serial lead byte: `1100 1xxx`.
pub const SERIAL_MASK: u8 = 0xF8;
pub const SERIAL_PATTERN: u8 = 0xC8;

/// Index bits 9-7 in analog and serial lead bytes.
pub const INDEX_HIGH3: u8 = 0x07;

/// Number of index bits carried by a continuation byte.
pub const INDEX_LOW_BITS: u32 = 7;

/// The five kinds of frame on an XSIG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Digital,
    Analog,
    Serial,
    Clear,
    Refresh,
}

impl SignalKind {
    /// Select a kind from the first byte of a frame.
    ///
    /// Returns `None` for bytes that cannot start a frame (MSB clear, or
    /// one of the unassigned lead patterns such as `0xD8` or `0xFE`).
    pub fn classify(lead: u8) -> Option<Self> {
        if lead == CLEAR_OPCODE {
            Some(Self::Clear)
        } else if lead == REFRESH_OPCODE {
            Some(Self::Refresh)
        } else if lead & DIGITAL_MASK == DIGITAL_PATTERN {
            Some(Self::Digital)
        } else if lead & ANALOG_MASK == ANALOG_PATTERN {
            Some(Self::Analog)
        } else if lead & SERIAL_MASK == SERIAL_PATTERN {
            Some(Self::Serial)
        } else {
            None
        }
    }

    /// Exact wire size for fixed-length kinds; `None` for serial frames,
    /// which run until the sentinel.
    pub fn wire_size(self) -> Option<usize> {
        match self {
            Self::Clear | Self::Refresh => Some(1),
            Self::Digital => Some(2),
            Self::Analog => Some(4),
            Self::Serial => None,
        }
    }

    /// Largest index addressable by this kind, if it carries one.
    pub fn max_index(self) -> Option<u16> {
        match self {
            Self::Digital => Some(4095),
            Self::Analog | Self::Serial => Some(1023),
            Self::Clear | Self::Refresh => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Digital => "digital",
            Self::Analog => "analog",
            Self::Serial => "serial",
            Self::Clear => "clear",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns true if `byte` may appear as a continuation byte.
pub fn is_continuation(byte: u8) -> bool {
    byte & CONTINUATION_MASK == 0
}
