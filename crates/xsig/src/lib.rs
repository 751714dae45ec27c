//! Crestron XSIG / ISC signal codec.
//!
//! xsig encodes and decodes the compact, self-framing signal stream spoken by
//! Crestron control processors over their Internal Signal Channel.
//!
//! # Crate Structure
//!
//! - [`codec`]: value codec, stream reader/writer, buffer codec and the
//!   `tokio_util` codec (behind the `async` feature)
//!
//! The `xsig` binary (behind the `cli` feature) encodes single signals and
//! decodes captured streams from the command line.

/// Re-export codec types.
pub mod codec {
    pub use xsig_codec::*;
}

pub use xsig_codec::{Signal, SignalKind, SignalReader, SignalWriter, Wire, XsigError};
