use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::codec::ReaderConfig;
use crate::error::{Result, Violation, XsigError};
use crate::kind::{SignalKind, SENTINEL};
use crate::serial::SerialTransition;
use crate::signal::Signal;

/// Reads successive signals from a buffered byte stream.
///
/// Framing is recovered from the lead byte of each frame alone. Once a
/// frame breaks the bit layout the reader is poisoned: every later call
/// returns the same `InvalidEncoding` error without touching the stream.
pub struct SignalReader<R> {
    inner: R,
    config: ReaderConfig,
    scratch: Vec<u8>,
    poisoned: Option<Violation>,
}

impl<R: BufRead> SignalReader<R> {
    /// Create a new signal reader with default configuration.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new signal reader with explicit configuration.
    pub fn with_config(inner: R, config: ReaderConfig) -> Self {
        Self {
            inner,
            config,
            scratch: Vec::with_capacity(SerialTransition::MAX_WIRE_SIZE),
            poisoned: None,
        }
    }

    /// Read the next signal (blocking).
    ///
    /// Returns `Err(XsigError::EndOfStream)` when the stream ends on a frame
    /// boundary and `Err(XsigError::Truncated { .. })` when it ends inside a
    /// frame. Neither poisons the reader.
    pub fn decode_next(&mut self) -> Result<Signal> {
        if let Some(violation) = self.poisoned {
            return Err(XsigError::InvalidEncoding(violation));
        }

        let lead = self.peek()?;
        let Some(kind) = SignalKind::classify(lead) else {
            return Err(self.poison(Violation::UnknownLeadByte(lead)));
        };

        self.scratch.clear();
        match kind.wire_size() {
            Some(size) => self.read_fixed(kind, size)?,
            None => self.read_serial()?,
        }

        match Signal::decode_as(kind, &self.scratch) {
            Ok(signal) => {
                trace!(kind = %kind, len = self.scratch.len(), "decoded signal");
                Ok(signal)
            }
            Err(XsigError::InvalidEncoding(violation)) => Err(self.poison(violation)),
            Err(err) => Err(err),
        }
    }

    /// Iterate over the remaining signals.
    ///
    /// The iterator ends at a clean end of stream and stops after yielding
    /// the first error.
    pub fn signals(&mut self) -> Signals<'_, R> {
        Signals {
            reader: self,
            done: false,
        }
    }

    /// Whether a framing error has permanently stopped this reader.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Update the serial frame limit for subsequent reads.
    pub fn set_max_serial_frame(&mut self, max_serial_frame: Option<usize>) {
        self.config.max_serial_frame = max_serial_frame;
    }

    /// Current signal reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn peek(&mut self) -> Result<u8> {
        loop {
            match self.inner.fill_buf() {
                Ok([]) => return Err(XsigError::EndOfStream),
                Ok(buf) => return Ok(buf[0]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(XsigError::Io(err)),
            }
        }
    }

    fn read_fixed(&mut self, kind: SignalKind, size: usize) -> Result<()> {
        self.scratch.resize(size, 0);
        let mut filled = 0usize;
        while filled < size {
            match self.inner.read(&mut self.scratch[filled..]) {
                Ok(0) => {
                    return Err(XsigError::Truncated {
                        kind,
                        received: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(XsigError::Io(err)),
            }
        }
        Ok(())
    }

    fn read_serial(&mut self) -> Result<()> {
        let read = match self.config.max_serial_frame {
            Some(max) => (&mut self.inner)
                .take(max as u64)
                .read_until(SENTINEL, &mut self.scratch),
            None => self.inner.read_until(SENTINEL, &mut self.scratch),
        }?;

        if self.scratch.last() != Some(&SENTINEL) {
            return match self.config.max_serial_frame {
                Some(max) if read >= max => {
                    Err(self.poison(Violation::UnterminatedSerial { scanned: read }))
                }
                _ => Err(XsigError::Truncated {
                    kind: SignalKind::Serial,
                    received: read,
                }),
            };
        }
        if self.scratch.len() < SerialTransition::MIN_WIRE_SIZE {
            return Err(self.poison(Violation::EarlySentinel));
        }
        Ok(())
    }

    fn poison(&mut self, violation: Violation) -> XsigError {
        debug!(%violation, "xsig stream poisoned");
        self.poisoned = Some(violation);
        XsigError::InvalidEncoding(violation)
    }
}

impl<T: Read> SignalReader<BufReader<T>> {
    /// Create a signal reader over an unbuffered stream.
    pub fn buffered(inner: T) -> Self {
        Self::new(BufReader::new(inner))
    }
}

/// Iterator over the signals of a [`SignalReader`].
pub struct Signals<'a, R> {
    reader: &'a mut SignalReader<R>,
    done: bool,
}

impl<R: BufRead> Iterator for Signals<'_, R> {
    type Item = Result<Signal>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.decode_next() {
            Ok(signal) => Some(Ok(signal)),
            Err(XsigError::EndOfStream) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for Signals<'_, R> {}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{Bytes, BytesMut};

    use super::*;
    use crate::analog::AnalogTransition;
    use crate::codec::encode_signal;
    use crate::digital::DigitalTransition;
    use crate::operation::{ClearOperation, RefreshOperation};

    fn reader(bytes: &[u8]) -> SignalReader<Cursor<Vec<u8>>> {
        SignalReader::new(Cursor::new(bytes.to_vec()))
    }

    fn wire(signals: &[Signal]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for signal in signals {
            encode_signal(signal, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_clear_and_refresh() {
        assert_eq!(
            reader(&[0xFC]).decode_next().unwrap(),
            Signal::Clear(ClearOperation)
        );
        assert_eq!(
            reader(&[0xFD]).decode_next().unwrap(),
            Signal::Refresh(RefreshOperation)
        );
    }

    #[test]
    fn read_digital() {
        let mut reader = reader(&[0xA0, 0x01]);
        assert_eq!(
            reader.decode_next().unwrap(),
            Signal::Digital(DigitalTransition::new(1, false))
        );
        assert!(matches!(
            reader.decode_next().unwrap_err(),
            XsigError::EndOfStream
        ));
    }

    #[test]
    fn read_interleaved_kinds_in_order() {
        let signals = vec![
            Signal::from(DigitalTransition::new(4095, true)),
            Signal::from(ClearOperation),
            Signal::from(SerialTransition::new(2, &b"AB"[..])),
            Signal::from(AnalogTransition::new(5, 100)),
            Signal::from(SerialTransition::new(0, Bytes::new())),
            Signal::from(RefreshOperation),
            Signal::from(DigitalTransition::new(0, false)),
        ];
        let mut reader = SignalReader::new(Cursor::new(wire(&signals)));

        for expected in &signals {
            assert_eq!(&reader.decode_next().unwrap(), expected);
        }
        assert!(matches!(
            reader.decode_next().unwrap_err(),
            XsigError::EndOfStream
        ));
        assert!(!reader.is_poisoned());
    }

    #[test]
    fn each_kind_consumes_exactly_its_bytes() {
        let bytes = [0x80u8, 0x01, 0xFC, 0xC0, 0x05, 0x00, 0x64, 0xC8, 0x02, 0x41, 0xFF];
        let mut reader = SignalReader::new(Cursor::new(&bytes[..]));

        let mut positions = Vec::new();
        while reader.decode_next().is_ok() {
            positions.push(reader.get_ref().position());
        }
        assert_eq!(positions, [2, 3, 7, 11]);
    }

    #[test]
    fn empty_stream_is_end_of_stream() {
        let err = reader(&[]).decode_next().unwrap_err();
        assert!(matches!(err, XsigError::EndOfStream));
    }

    #[test]
    fn truncated_digital_is_not_invalid_encoding() {
        let mut reader = reader(&[0x80]);
        let err = reader.decode_next().unwrap_err();
        assert!(matches!(
            err,
            XsigError::Truncated {
                kind: SignalKind::Digital,
                received: 1
            }
        ));
        assert!(!reader.is_poisoned());
    }

    #[test]
    fn truncated_analog() {
        let err = reader(&[0xC0, 0x05]).decode_next().unwrap_err();
        assert!(matches!(
            err,
            XsigError::Truncated {
                kind: SignalKind::Analog,
                received: 2
            }
        ));
    }

    #[test]
    fn unterminated_serial_is_truncated() {
        let err = reader(&[0xC8, 0x02, 0x41, 0x42]).decode_next().unwrap_err();
        assert!(matches!(
            err,
            XsigError::Truncated {
                kind: SignalKind::Serial,
                received: 4
            }
        ));
    }

    #[test]
    fn unknown_lead_byte_poisons() {
        let mut reader = reader(&[0x41, 0xFC]);
        let first = reader.decode_next().unwrap_err();
        assert_eq!(first.violation(), Some(Violation::UnknownLeadByte(0x41)));
        assert!(reader.is_poisoned());

        // The valid opcode behind it is never reached.
        let second = reader.decode_next().unwrap_err();
        assert_eq!(second.violation(), Some(Violation::UnknownLeadByte(0x41)));
    }

    #[test]
    fn invalid_continuation_is_sticky() {
        let mut reader = reader(&[0x80, 0x81, 0xFC, 0xFD]);
        let expected = Violation::HighBitSet {
            offset: 1,
            byte: 0x81,
        };
        for _ in 0..3 {
            let err = reader.decode_next().unwrap_err();
            assert_eq!(err.violation(), Some(expected));
        }
        assert_eq!(reader.get_ref().position(), 2);
    }

    #[test]
    fn sentinel_in_serial_header_poisons() {
        let mut reader = reader(&[0xC8, 0xFF, 0xFC]);
        let err = reader.decode_next().unwrap_err();
        assert_eq!(err.violation(), Some(Violation::EarlySentinel));
        assert!(reader.is_poisoned());
    }

    #[test]
    fn serial_limit_poisons() {
        let mut bytes = vec![0xC8u8, 0x00];
        bytes.extend_from_slice(&[b'x'; 20]);
        bytes.push(0xFF);

        let cfg = ReaderConfig {
            max_serial_frame: Some(8),
        };
        let mut reader = SignalReader::with_config(Cursor::new(bytes), cfg);
        let err = reader.decode_next().unwrap_err();
        assert_eq!(
            err.violation(),
            Some(Violation::UnterminatedSerial { scanned: 8 })
        );
        assert!(reader.is_poisoned());
    }

    #[test]
    fn serial_limit_allows_frame_that_fits() {
        let cfg = ReaderConfig {
            max_serial_frame: Some(5),
        };
        let mut reader =
            SignalReader::with_config(Cursor::new(vec![0xC8, 0x02, 0x41, 0x42, 0xFF]), cfg);
        assert_eq!(
            reader.decode_next().unwrap(),
            Signal::from(SerialTransition::new(2, &b"AB"[..]))
        );
        assert_eq!(reader.config().max_serial_frame, Some(5));
    }

    #[test]
    fn partial_read_handling() {
        let signals = vec![
            Signal::from(AnalogTransition::new(1023, 0xFFFF)),
            Signal::from(SerialTransition::new(7, &b"slow"[..])),
            Signal::from(DigitalTransition::new(12, true)),
        ];
        let source = ByteByByteReader {
            bytes: wire(&signals),
            pos: 0,
        };
        let mut reader = SignalReader::new(BufReader::with_capacity(1, source));

        for expected in &signals {
            assert_eq!(&reader.decode_next().unwrap(), expected);
        }
    }

    #[test]
    fn buffered_wraps_plain_reader() {
        let source = ByteByByteReader {
            bytes: vec![0xFD, 0xFC],
            pos: 0,
        };
        let mut reader = SignalReader::buffered(source);
        assert_eq!(reader.decode_next().unwrap(), Signal::from(RefreshOperation));
        assert_eq!(reader.decode_next().unwrap(), Signal::from(ClearOperation));
    }

    #[test]
    fn interrupted_read_retries() {
        let source = InterruptedThenData {
            state: 0,
            bytes: vec![0x81, 0x00],
            pos: 0,
        };
        let mut reader = SignalReader::buffered(source);
        assert_eq!(
            reader.decode_next().unwrap(),
            Signal::from(DigitalTransition::new(128, true))
        );
    }

    #[test]
    fn source_error_propagates_without_poisoning() {
        let source = FailingReader { failures: 1 };
        let mut reader = SignalReader::buffered(source);

        let err = reader.decode_next().unwrap_err();
        assert!(matches!(err, XsigError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
        assert!(!reader.is_poisoned());

        // The source recovered; so does the reader.
        assert!(matches!(
            reader.decode_next().unwrap_err(),
            XsigError::EndOfStream
        ));
    }

    #[test]
    fn signals_iterator_stops_at_end() {
        let signals = vec![
            Signal::from(ClearOperation),
            Signal::from(DigitalTransition::new(3, true)),
        ];
        let mut reader = SignalReader::new(Cursor::new(wire(&signals)));
        let decoded: Vec<Signal> = reader.signals().collect::<Result<_>>().unwrap();
        assert_eq!(decoded, signals);
    }

    #[test]
    fn signals_iterator_stops_after_error() {
        let mut reader = reader(&[0xFC, 0x00, 0xFD]);
        let mut iter = reader.signals();
        assert!(matches!(iter.next(), Some(Ok(Signal::Clear(_)))));
        assert!(matches!(iter.next(), Some(Err(XsigError::InvalidEncoding(_)))));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = reader(&[]);
        reader.set_max_serial_frame(Some(64));
        assert_eq!(reader.config().max_serial_frame, Some(64));

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::SignalWriter::new(left);
        let mut reader = SignalReader::buffered(right);

        writer.send(DigitalTransition::new(42, true)).unwrap();
        writer.send(SerialTransition::new(9, &b"ping"[..])).unwrap();
        writer.refresh().unwrap();

        assert_eq!(
            reader.decode_next().unwrap(),
            Signal::from(DigitalTransition::new(42, true))
        );
        assert_eq!(
            reader.decode_next().unwrap(),
            Signal::from(SerialTransition::new(9, &b"ping"[..]))
        );
        assert_eq!(reader.decode_next().unwrap(), Signal::from(RefreshOperation));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct FailingReader {
        failures: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(std::io::Error::from(ErrorKind::ConnectionReset));
            }
            Ok(0)
        }
    }
}
