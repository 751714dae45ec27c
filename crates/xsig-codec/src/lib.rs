//! Encoder and stream decoder for the Crestron XSIG / ISC signal wire format.
//!
//! XSIG frames are self-delimiting. The lead byte of each frame selects one
//! of five kinds:
//! - Digital transitions (2 bytes, 12-bit index)
//! - Analog transitions (4 bytes, 10-bit index, 16-bit value)
//! - Serial transitions (10-bit index, up to 252 payload bytes, `0xFF`
//!   terminated)
//! - Clear (`0xFC`) and refresh (`0xFD`) operations
//!
//! [`SignalReader`] pulls frames off any `BufRead`; [`SignalWriter`] pushes
//! them into any `Write`. With the `async` feature, [`XsigCodec`] plugs the
//! same framing into `tokio_util::codec`.

pub mod analog;
pub mod codec;
pub mod digital;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod kind;
pub mod operation;
pub mod reader;
pub mod serial;
pub mod signal;
pub mod writer;

pub use analog::AnalogTransition;
pub use codec::{decode_signal, encode_signal, ReaderConfig};
pub use digital::DigitalTransition;
pub use error::{Result, Violation, XsigError};
#[cfg(feature = "async")]
pub use framed::XsigCodec;
pub use kind::{SignalKind, CLEAR_OPCODE, REFRESH_OPCODE, SENTINEL};
pub use operation::{ClearOperation, RefreshOperation};
pub use reader::{SignalReader, Signals};
pub use serial::SerialTransition;
pub use signal::{Signal, Wire};
pub use writer::SignalWriter;
