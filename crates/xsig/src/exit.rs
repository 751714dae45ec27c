use std::fmt;
use std::io;

use xsig_codec::XsigError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn xsig_error(context: &str, err: XsigError) -> CliError {
    match err {
        XsigError::Io(source) => io_error(context, source),
        XsigError::IndexOutOfRange { .. }
        | XsigError::SerialTooLong { .. }
        | XsigError::InvalidSerialByte { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        XsigError::ShortBuffer { .. }
        | XsigError::InvalidEncoding(_)
        | XsigError::Truncated { .. } => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        XsigError::EndOfStream => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}
