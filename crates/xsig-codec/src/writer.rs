use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::encode_signal;
use crate::error::{Result, XsigError};
use crate::operation::{ClearOperation, RefreshOperation};
use crate::serial::SerialTransition;
use crate::signal::Signal;

/// Writes encoded signals to any `Write` stream.
///
/// Each signal is validated and encoded in full before any byte reaches the
/// stream, then flushed.
pub struct SignalWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> SignalWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(SerialTransition::MAX_WIRE_SIZE),
        }
    }

    /// Write a complete signal (blocking).
    pub fn write_signal(&mut self, signal: &Signal) -> Result<()> {
        self.buf.clear();
        encode_signal(signal, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(XsigError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(XsigError::Io(err)),
            }
        }

        self.flush()
    }

    /// Encode and send any signal value.
    pub fn send(&mut self, signal: impl Into<Signal>) -> Result<()> {
        self.write_signal(&signal.into())
    }

    /// Send a clear operation.
    pub fn clear(&mut self) -> Result<()> {
        self.send(ClearOperation)
    }

    /// Send a refresh operation.
    pub fn refresh(&mut self) -> Result<()> {
        self.send(RefreshOperation)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(XsigError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
