use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::error::{Result, Violation, XsigError};
use crate::kind::{SignalKind, SENTINEL};
use crate::serial::SerialTransition;
use crate::signal::{Signal, Wire};

/// Configuration shared by the stream and buffer decoders.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Upper bound on a serial frame, sentinel included. `None` scans
    /// without limit for the terminator.
    pub max_serial_frame: Option<usize>,
}

impl ReaderConfig {
    /// Bound serial frames to the largest size an encoder can produce.
    pub fn strict() -> Self {
        Self {
            max_serial_frame: Some(SerialTransition::MAX_WIRE_SIZE),
        }
    }
}

/// Append the wire form of `signal` to `dst`.
pub fn encode_signal(signal: &Signal, dst: &mut BytesMut) -> Result<()> {
    signal.encode(dst)?;
    trace!(kind = %signal.kind(), len = signal.encoded_len(), "encoded signal");
    Ok(())
}

/// Decode one signal from the front of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete frame yet.
/// On success, consumes exactly that frame's bytes. On error the buffer is
/// left untouched.
pub fn decode_signal(src: &mut BytesMut, config: &ReaderConfig) -> Result<Option<Signal>> {
    let Some(&lead) = src.first() else {
        return Ok(None);
    };
    let kind = SignalKind::classify(lead)
        .ok_or(XsigError::InvalidEncoding(Violation::UnknownLeadByte(lead)))?;

    let len = match kind.wire_size() {
        Some(size) if src.len() < size => return Ok(None),
        Some(size) => size,
        None => match serial_frame_len(src, config.max_serial_frame)? {
            Some(len) => len,
            None => return Ok(None),
        },
    };

    let signal = Signal::decode_as(kind, &src[..len])?;
    src.advance(len);
    trace!(kind = %kind, len, "decoded signal");
    Ok(Some(signal))
}

/// Length of the serial frame at the front of `buf`, if its sentinel has
/// arrived.
fn serial_frame_len(buf: &[u8], max: Option<usize>) -> Result<Option<usize>> {
    let window = max.map_or(buf.len(), |max| max.min(buf.len()));
    match buf[..window].iter().position(|&b| b == SENTINEL) {
        Some(pos) if pos < SerialTransition::HEADER_SIZE => {
            Err(XsigError::InvalidEncoding(Violation::EarlySentinel))
        }
        Some(pos) => Ok(Some(pos + 1)),
        None => match max {
            Some(max) if buf.len() >= max => Err(XsigError::InvalidEncoding(
                Violation::UnterminatedSerial { scanned: max },
            )),
            _ => Ok(None),
        },
    }
}
