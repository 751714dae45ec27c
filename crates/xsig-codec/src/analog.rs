use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::kind::{
    SignalKind, ANALOG_MASK, ANALOG_PATTERN, ANALOG_VALUE_HIGH, ANALOG_VALUE_HIGH_SHIFT,
    INDEX_HIGH3, INDEX_LOW_BITS, LOW7,
};
use crate::signal::{check_continuation, check_index, check_lead, check_len, Wire};

/// Bits 15-14 of the value travel in the lead byte.
const VALUE_TOP_SHIFT: u32 = 14;
/// Bits 13-7 of the value travel in byte 2.
const VALUE_MID_SHIFT: u32 = 7;

/// An analog (16-bit) signal changed value.
///
/// Wire format:
/// ```text
/// ┌───────────────────┬────────────────┬────────────────┬────────────────┐
/// │ 1 1 v v 0 i i i   │ 0 i i i i i i i│ 0 v v v v v v v│ 0 v v v v v v v│
/// │ value 15-14,      │ index 6-0      │ value 13-7     │ value 6-0      │
/// │ index 9-7         │                │                │                │
/// └───────────────────┴────────────────┴────────────────┴────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalogTransition {
    pub index: u16,
    pub value: u16,
}

impl AnalogTransition {
    pub const WIRE_SIZE: usize = 4;
    pub const MAX_INDEX: u16 = 1023;

    pub fn new(index: u16, value: u16) -> Self {
        Self { index, value }
    }
}

impl Wire for AnalogTransition {
    fn encoded_len(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        // Every u16 is representable: 2 + 7 + 7 bits.
        check_index(SignalKind::Analog, self.index, Self::MAX_INDEX)?;

        let value_top = ((self.value >> VALUE_TOP_SHIFT) as u8) << ANALOG_VALUE_HIGH_SHIFT;
        let index_top = (self.index >> INDEX_LOW_BITS) as u8 & INDEX_HIGH3;

        dst.reserve(Self::WIRE_SIZE);
        dst.put_u8(ANALOG_PATTERN | value_top | index_top);
        dst.put_u8(self.index as u8 & LOW7);
        dst.put_u8((self.value >> VALUE_MID_SHIFT) as u8 & LOW7);
        dst.put_u8(self.value as u8 & LOW7);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf, Self::WIRE_SIZE)?;
        check_lead(SignalKind::Analog, buf[0], ANALOG_MASK, ANALOG_PATTERN)?;
        for offset in 1..Self::WIRE_SIZE {
            check_continuation(buf, offset)?;
        }

        let index = (u16::from(buf[0] & INDEX_HIGH3) << INDEX_LOW_BITS) | u16::from(buf[1]);
        let value_top = u16::from((buf[0] & ANALOG_VALUE_HIGH) >> ANALOG_VALUE_HIGH_SHIFT);
        let value = (value_top << VALUE_TOP_SHIFT)
            | (u16::from(buf[2]) << VALUE_MID_SHIFT)
            | u16::from(buf[3]);
        Ok(Self { index, value })
    }
}
