use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};

use bytes::BytesMut;
use tracing::{debug, info};
use xsig_codec::{encode_signal, ReaderConfig, Signal, SignalReader, XsigError};

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, xsig_error, CliResult, SUCCESS};
use crate::output::{print_signal, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let source = open_source(&args)?;
    let config = ReaderConfig {
        max_serial_frame: args.max_serial_frame,
    };
    let mut reader = SignalReader::with_config(source, config);

    let decoded = decode_all(&mut reader, args.count, |signal, wire| {
        print_signal(signal, wire, format)
    })?;
    info!(decoded, "decode finished");
    Ok(SUCCESS)
}

fn open_source(args: &DecodeArgs) -> CliResult<Box<dyn BufRead>> {
    if let Some(hex) = &args.hex {
        return Ok(Box::new(Cursor::new(parse_hex(hex)?)));
    }
    match &args.file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("open {}", path.display()), err))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Decode until the stream ends or `limit` signals were seen.
///
/// `emit` receives each signal with its re-encoded wire bytes. Signals
/// decoded before a framing error are still emitted.
fn decode_all<R, F>(
    reader: &mut SignalReader<R>,
    limit: Option<usize>,
    mut emit: F,
) -> CliResult<usize>
where
    R: BufRead,
    F: FnMut(&Signal, &[u8]),
{
    let mut wire = BytesMut::new();
    let mut decoded = 0usize;

    while limit.is_none_or(|limit| decoded < limit) {
        let signal = match reader.decode_next() {
            Ok(signal) => signal,
            Err(XsigError::EndOfStream) => break,
            Err(err) => {
                debug!(decoded, error = %err, "decode stopped");
                return Err(xsig_error("decode failed", err));
            }
        };

        wire.clear();
        encode_signal(&signal, &mut wire).map_err(|err| xsig_error("re-encode failed", err))?;
        emit(&signal, &wire);
        decoded += 1;
    }

    Ok(decoded)
}
