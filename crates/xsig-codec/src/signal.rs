use bytes::{Bytes, BytesMut};

use crate::analog::AnalogTransition;
use crate::digital::DigitalTransition;
use crate::error::{Result, Violation, XsigError};
use crate::kind::{is_continuation, SignalKind};
use crate::operation::{ClearOperation, RefreshOperation};
use crate::serial::SerialTransition;

/// Conversion between a typed value and its XSIG wire bytes.
///
/// `encode` validates before writing, so a failed encode leaves `dst`
/// untouched. `decode` reads one pre-framed value from the front of `buf`.
pub trait Wire: Sized {
    /// Number of bytes `encode` appends.
    fn encoded_len(&self) -> usize;

    /// Append the wire form of `self` to `dst`.
    fn encode(&self, dst: &mut BytesMut) -> Result<()>;

    /// Decode a value from a single pre-framed buffer.
    fn decode(buf: &[u8]) -> Result<Self>;

    /// Encode into a freshly allocated buffer.
    fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// One decoded element of an XSIG stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Digital(DigitalTransition),
    Analog(AnalogTransition),
    Serial(SerialTransition),
    Clear(ClearOperation),
    Refresh(RefreshOperation),
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Digital(_) => SignalKind::Digital,
            Self::Analog(_) => SignalKind::Analog,
            Self::Serial(_) => SignalKind::Serial,
            Self::Clear(_) => SignalKind::Clear,
            Self::Refresh(_) => SignalKind::Refresh,
        }
    }

    /// Signal index for transitions; `None` for operations.
    pub fn index(&self) -> Option<u16> {
        match self {
            Self::Digital(t) => Some(t.index),
            Self::Analog(t) => Some(t.index),
            Self::Serial(t) => Some(t.index),
            Self::Clear(_) | Self::Refresh(_) => None,
        }
    }

    /// Decode `buf` as the kind selected by its first byte.
    pub(crate) fn decode_as(kind: SignalKind, buf: &[u8]) -> Result<Self> {
        Ok(match kind {
            SignalKind::Digital => Self::Digital(DigitalTransition::decode(buf)?),
            SignalKind::Analog => Self::Analog(AnalogTransition::decode(buf)?),
            SignalKind::Serial => Self::Serial(SerialTransition::decode(buf)?),
            SignalKind::Clear => Self::Clear(ClearOperation::decode(buf)?),
            SignalKind::Refresh => Self::Refresh(RefreshOperation::decode(buf)?),
        })
    }
}

impl Wire for Signal {
    fn encoded_len(&self) -> usize {
        match self {
            Self::Digital(t) => t.encoded_len(),
            Self::Analog(t) => t.encoded_len(),
            Self::Serial(t) => t.encoded_len(),
            Self::Clear(op) => op.encoded_len(),
            Self::Refresh(op) => op.encoded_len(),
        }
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            Self::Digital(t) => t.encode(dst),
            Self::Analog(t) => t.encode(dst),
            Self::Serial(t) => t.encode(dst),
            Self::Clear(op) => op.encode(dst),
            Self::Refresh(op) => op.encode(dst),
        }
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let Some(&lead) = buf.first() else {
            return Err(XsigError::ShortBuffer {
                needed: 1,
                available: 0,
            });
        };
        let kind = SignalKind::classify(lead)
            .ok_or(XsigError::InvalidEncoding(Violation::UnknownLeadByte(lead)))?;
        Self::decode_as(kind, buf)
    }
}

impl From<DigitalTransition> for Signal {
    fn from(t: DigitalTransition) -> Self {
        Self::Digital(t)
    }
}

impl From<AnalogTransition> for Signal {
    fn from(t: AnalogTransition) -> Self {
        Self::Analog(t)
    }
}

impl From<SerialTransition> for Signal {
    fn from(t: SerialTransition) -> Self {
        Self::Serial(t)
    }
}

impl From<ClearOperation> for Signal {
    fn from(op: ClearOperation) -> Self {
        Self::Clear(op)
    }
}

impl From<RefreshOperation> for Signal {
    fn from(op: RefreshOperation) -> Self {
        Self::Refresh(op)
    }
}

pub(crate) fn check_len(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(XsigError::ShortBuffer {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_lead(kind: SignalKind, byte: u8, mask: u8, pattern: u8) -> Result<()> {
    if byte & mask != pattern {
        return Err(XsigError::InvalidEncoding(Violation::LeadPattern { kind, byte }));
    }
    Ok(())
}

pub(crate) fn check_continuation(buf: &[u8], offset: usize) -> Result<()> {
    let byte = buf[offset];
    if !is_continuation(byte) {
        return Err(XsigError::InvalidEncoding(Violation::HighBitSet { offset, byte }));
    }
    Ok(())
}

pub(crate) fn check_index(kind: SignalKind, index: u16, max: u16) -> Result<()> {
    if index > max {
        return Err(XsigError::IndexOutOfRange { kind, index, max });
    }
    Ok(())
}
