use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::kind::{
    SignalKind, DIGITAL_COMPLEMENT, DIGITAL_INDEX_HIGH, DIGITAL_MASK, DIGITAL_PATTERN,
    INDEX_LOW_BITS, LOW7,
};
use crate::signal::{check_continuation, check_index, check_lead, check_len, Wire};

/// A digital (boolean) signal changed state.
///
/// Wire format:
/// ```text
/// ┌────────────────────────────┬──────────────────┐
/// │ 1 0 c i i i i i            │ 0 i i i i i i i  │
/// │ c = !value, index bits 11-7│ index bits 6-0   │
/// └────────────────────────────┴──────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitalTransition {
    pub index: u16,
    pub value: bool,
}

impl DigitalTransition {
    pub const WIRE_SIZE: usize = 2;
    pub const MAX_INDEX: u16 = 4095;

    pub fn new(index: u16, value: bool) -> Self {
        Self { index, value }
    }
}

impl Wire for DigitalTransition {
    fn encoded_len(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        check_index(SignalKind::Digital, self.index, Self::MAX_INDEX)?;

        // The wire carries the complement of the value.
        let high = (self.index >> INDEX_LOW_BITS) as u8 & DIGITAL_INDEX_HIGH;
        let mut lead = DIGITAL_PATTERN | high;
        if !self.value {
            lead |= DIGITAL_COMPLEMENT;
        }

        dst.reserve(Self::WIRE_SIZE);
        dst.put_u8(lead);
        dst.put_u8(self.index as u8 & LOW7);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf, Self::WIRE_SIZE)?;
        check_lead(SignalKind::Digital, buf[0], DIGITAL_MASK, DIGITAL_PATTERN)?;
        check_continuation(buf, 1)?;

        let index = (u16::from(buf[0] & DIGITAL_INDEX_HIGH) << INDEX_LOW_BITS) | u16::from(buf[1]);
        let value = buf[0] & DIGITAL_COMPLEMENT == 0;
        Ok(Self { index, value })
    }
}
