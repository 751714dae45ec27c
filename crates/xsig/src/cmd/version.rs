use xsig_codec::{SerialTransition, SignalKind};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    let version = env!("CARGO_PKG_VERSION");
    if !args.extended {
        println!("xsig {version}");
        return Ok(SUCCESS);
    }

    println!("name: xsig");
    println!("version: {version}");
    println!("target: {}-{}", std::env::consts::ARCH, std::env::consts::OS);
    println!("async: {}", cfg!(feature = "async"));
    for kind in [SignalKind::Digital, SignalKind::Analog, SignalKind::Serial] {
        if let Some(max) = kind.max_index() {
            println!("{kind}_max_index: {max}");
        }
    }
    println!("serial_max_payload: {}", SerialTransition::MAX_LEN);

    Ok(SUCCESS)
}
