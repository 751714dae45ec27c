//! `tokio_util::codec` integration (requires the `async` feature).

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::codec::{decode_signal, encode_signal, ReaderConfig};
use crate::error::{Violation, XsigError};
use crate::kind::SignalKind;
use crate::signal::Signal;

/// Signal codec for `FramedRead` / `FramedWrite`.
///
/// Shares the poisoning policy of [`SignalReader`](crate::SignalReader):
/// after the first framing violation every decode call fails with it.
#[derive(Debug, Clone, Default)]
pub struct XsigCodec {
    config: ReaderConfig,
    poisoned: Option<Violation>,
}

impl XsigCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            config,
            poisoned: None,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl Decoder for XsigCodec {
    type Item = Signal;
    type Error = XsigError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Signal>, XsigError> {
        if let Some(violation) = self.poisoned {
            return Err(XsigError::InvalidEncoding(violation));
        }
        match decode_signal(src, &self.config) {
            Err(XsigError::InvalidEncoding(violation)) => {
                debug!(%violation, "xsig codec poisoned");
                self.poisoned = Some(violation);
                Err(XsigError::InvalidEncoding(violation))
            }
            other => other,
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Signal>, XsigError> {
        if let Some(signal) = self.decode(buf)? {
            return Ok(Some(signal));
        }
        let Some(&lead) = buf.first() else {
            return Ok(None);
        };
        match SignalKind::classify(lead) {
            Some(kind) => Err(XsigError::Truncated {
                kind,
                received: buf.len(),
            }),
            None => Err(XsigError::InvalidEncoding(Violation::UnknownLeadByte(lead))),
        }
    }
}

impl Encoder<Signal> for XsigCodec {
    type Error = XsigError;

    fn encode(&mut self, item: Signal, dst: &mut BytesMut) -> Result<(), XsigError> {
        encode_signal(&item, dst)
    }
}

impl Encoder<&Signal> for XsigCodec {
    type Error = XsigError;

    fn encode(&mut self, item: &Signal, dst: &mut BytesMut) -> Result<(), XsigError> {
        encode_signal(item, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::analog::AnalogTransition;
    use crate::digital::DigitalTransition;
    use crate::operation::{ClearOperation, RefreshOperation};
    use crate::serial::SerialTransition;

    #[tokio::test]
    async fn framed_roundtrip() {
        let signals = vec![
            Signal::from(ClearOperation),
            Signal::from(DigitalTransition::new(1, true)),
            Signal::from(AnalogTransition::new(5, 100)),
            Signal::from(SerialTransition::new(2, &b"AB"[..])),
            Signal::from(RefreshOperation),
        ];

        let mut tx = FramedWrite::new(Vec::new(), XsigCodec::new());
        for signal in &signals {
            tx.send(signal).await.unwrap();
        }
        let wire = tx.into_inner();
        assert_eq!(wire.len(), 1 + 2 + 4 + 5 + 1);

        let mut rx = FramedRead::new(wire.as_slice(), XsigCodec::new());
        let mut decoded = Vec::new();
        while let Some(signal) = rx.next().await {
            decoded.push(signal.unwrap());
        }
        assert_eq!(decoded, signals);
    }

    #[tokio::test]
    async fn truncated_frame_at_eof() {
        let wire = [0xFCu8, 0xC0, 0x05];
        let mut rx = FramedRead::new(&wire[..], XsigCodec::new());

        assert_eq!(
            rx.next().await.unwrap().unwrap(),
            Signal::from(ClearOperation)
        );
        let err = rx.next().await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            XsigError::Truncated {
                kind: SignalKind::Analog,
                received: 2
            }
        ));
    }

    #[tokio::test]
    async fn encode_error_surfaces_from_sink() {
        let mut tx = FramedWrite::new(Vec::new(), XsigCodec::new());
        let err = tx
            .send(Signal::from(DigitalTransition::new(5000, true)))
            .await
            .unwrap_err();
        assert!(matches!(err, XsigError::IndexOutOfRange { .. }));
    }

    #[test]
    fn codec_poisoning_is_sticky() {
        let mut codec = XsigCodec::new();
        let mut buf = BytesMut::from(&[0x80, 0x80, 0xFC][..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, XsigError::InvalidEncoding(_)));
        assert!(codec.is_poisoned());

        // Fresh, valid bytes do not clear the poison.
        let mut clean = BytesMut::from(&[0xFC][..]);
        assert_eq!(
            codec.decode(&mut clean).unwrap_err().violation(),
            Some(Violation::HighBitSet {
                offset: 1,
                byte: 0x80
            })
        );
    }

    #[test]
    fn codec_uses_configured_serial_limit() {
        let mut codec = XsigCodec::with_config(ReaderConfig::strict());
        let mut buf = BytesMut::from(&[0xC8, 0x01][..]);
        buf.extend_from_slice(&[b'a'; 400]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err.violation(),
            Some(Violation::UnterminatedSerial { .. })
        ));
        assert_eq!(codec.config().max_serial_frame, Some(255));
    }
}
