use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a single signal and print its wire bytes.
    Encode(EncodeArgs),
    /// Decode a signal stream and print each signal.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(subcommand)]
    pub signal: SignalCommand,
}

#[derive(Subcommand, Debug)]
pub enum SignalCommand {
    /// Digital transition (index 0-4095).
    Digital {
        index: u16,
        /// New state: true or false.
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Analog transition (index 0-1023, value 0-65535).
    Analog { index: u16, value: u16 },
    /// Serial transition (index 0-1023, up to 252 bytes, no 0xFF).
    Serial {
        index: u16,
        /// Payload as UTF-8 text.
        #[arg(long, conflicts_with = "hex")]
        text: Option<String>,
        /// Payload as hex bytes.
        #[arg(long)]
        hex: Option<String>,
    },
    /// Clear operation.
    Clear,
    /// Refresh operation.
    Refresh,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read the stream from a file. Default: stdin.
    #[arg(conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Decode hex bytes given on the command line.
    #[arg(long)]
    pub hex: Option<String>,
    /// Exit after decoding N signals.
    #[arg(long)]
    pub count: Option<usize>,
    /// Reject serial frames longer than this (bytes, terminator included).
    #[arg(long, value_name = "BYTES")]
    pub max_serial_frame: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

/// Parse hex bytes, ignoring whitespace and `:` separators.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}
