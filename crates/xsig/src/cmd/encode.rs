use tracing::debug;
use xsig_codec::{
    AnalogTransition, ClearOperation, DigitalTransition, RefreshOperation, SerialTransition,
    Signal, Wire,
};

use crate::cmd::{parse_hex, EncodeArgs, SignalCommand};
use crate::exit::{xsig_error, CliResult, SUCCESS};
use crate::output::{print_signal, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let signal = build_signal(args.signal)?;
    let wire = signal
        .to_bytes()
        .map_err(|err| xsig_error("encode failed", err))?;
    debug!(kind = %signal.kind(), len = wire.len(), "encoded signal");

    print_signal(&signal, &wire, format);
    Ok(SUCCESS)
}

fn build_signal(command: SignalCommand) -> CliResult<Signal> {
    let signal = match command {
        SignalCommand::Digital { index, value } => DigitalTransition::new(index, value).into(),
        SignalCommand::Analog { index, value } => AnalogTransition::new(index, value).into(),
        SignalCommand::Serial { index, text, hex } => {
            let payload = match (text, hex) {
                (Some(text), _) => text.into_bytes(),
                (None, Some(hex)) => parse_hex(&hex)?,
                (None, None) => Vec::new(),
            };
            SerialTransition::new(index, payload).into()
        }
        SignalCommand::Clear => ClearOperation.into(),
        SignalCommand::Refresh => RefreshOperation.into(),
    };
    Ok(signal)
}
