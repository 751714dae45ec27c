//! Single-byte control operations.

use bytes::{BufMut, BytesMut};

use crate::error::{Result, Violation, XsigError};
use crate::kind::{SignalKind, CLEAR_OPCODE, REFRESH_OPCODE};
use crate::signal::{check_len, Wire};

/// Ask the peer to clear all signal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ClearOperation;

/// Ask the peer to resend its current signal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RefreshOperation;

impl Wire for ClearOperation {
    fn encoded_len(&self) -> usize {
        1
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(CLEAR_OPCODE);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        decode_opcode(buf, SignalKind::Clear, CLEAR_OPCODE)?;
        Ok(Self)
    }
}

impl Wire for RefreshOperation {
    fn encoded_len(&self) -> usize {
        1
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(REFRESH_OPCODE);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        decode_opcode(buf, SignalKind::Refresh, REFRESH_OPCODE)?;
        Ok(Self)
    }
}

fn decode_opcode(buf: &[u8], kind: SignalKind, opcode: u8) -> Result<()> {
    check_len(buf, 1)?;
    if buf[0] != opcode {
        return Err(XsigError::InvalidEncoding(Violation::LeadPattern {
            kind,
            byte: buf[0],
        }));
    }
    Ok(())
}
