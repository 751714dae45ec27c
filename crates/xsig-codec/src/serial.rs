use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, Violation, XsigError};
use crate::kind::{
    SignalKind, INDEX_HIGH3, INDEX_LOW_BITS, LOW7, SENTINEL, SERIAL_MASK, SERIAL_PATTERN,
};
use crate::signal::{check_continuation, check_index, check_lead, check_len, Wire};

/// A serial (byte string) signal changed value.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬─────────────────┬───────────────────┬──────┐
/// │ 1 1 0 0 1 i i i  │ 0 i i i i i i i │ payload           │ 0xFF │
/// │ index bits 9-7   │ index bits 6-0  │ (0-252 bytes)     │      │
/// └──────────────────┴─────────────────┴───────────────────┴──────┘
/// ```
///
/// The format has no escape mechanism: a payload can never contain `0xFF`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialTransition {
    pub index: u16,
    pub value: Bytes,
}

impl SerialTransition {
    pub const MAX_INDEX: u16 = 1023;
    /// Longest payload that fits one frame.
    pub const MAX_LEN: usize = 252;
    /// Lead byte + index byte.
    pub const HEADER_SIZE: usize = 2;
    /// Header + sentinel, empty payload.
    pub const MIN_WIRE_SIZE: usize = Self::HEADER_SIZE + 1;
    pub const MAX_WIRE_SIZE: usize = Self::MIN_WIRE_SIZE + Self::MAX_LEN;

    pub fn new(index: u16, value: impl Into<Bytes>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}

impl Wire for SerialTransition {
    fn encoded_len(&self) -> usize {
        Self::MIN_WIRE_SIZE + self.value.len()
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        check_index(SignalKind::Serial, self.index, Self::MAX_INDEX)?;
        if self.value.len() > Self::MAX_LEN {
            return Err(XsigError::SerialTooLong {
                len: self.value.len(),
                max: Self::MAX_LEN,
            });
        }
        if let Some(offset) = self.value.iter().position(|&b| b == SENTINEL) {
            return Err(XsigError::InvalidSerialByte { offset });
        }

        dst.reserve(self.encoded_len());
        dst.put_u8(SERIAL_PATTERN | ((self.index >> INDEX_LOW_BITS) as u8 & INDEX_HIGH3));
        dst.put_u8(self.index as u8 & LOW7);
        dst.put_slice(&self.value);
        dst.put_u8(SENTINEL);
        Ok(())
    }

    /// Decode exactly one serial frame, sentinel included.
    ///
    /// A buffer that does not end in the sentinel is reported as short:
    /// the frame is still waiting for its terminator.
    fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf, Self::MIN_WIRE_SIZE)?;
        if buf[buf.len() - 1] != SENTINEL {
            return Err(XsigError::ShortBuffer {
                needed: buf.len() + 1,
                available: buf.len(),
            });
        }
        check_lead(SignalKind::Serial, buf[0], SERIAL_MASK, SERIAL_PATTERN)?;
        check_continuation(buf, 1)?;

        let payload = &buf[Self::HEADER_SIZE..buf.len() - 1];
        if let Some(pos) = payload.iter().position(|&b| b == SENTINEL) {
            return Err(XsigError::InvalidEncoding(Violation::EmbeddedSentinel {
                offset: Self::HEADER_SIZE + pos,
            }));
        }

        let index = (u16::from(buf[0] & INDEX_HIGH3) << INDEX_LOW_BITS) | u16::from(buf[1]);
        Ok(Self {
            index,
            value: Bytes::copy_from_slice(payload),
        })
    }
}
