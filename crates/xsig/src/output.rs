use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use xsig_codec::Signal;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SignalOutput {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<u16>,
    #[serde(skip_serializing_if = "Value::is_null")]
    value: Value,
    wire: String,
}

impl SignalOutput {
    fn new(signal: &Signal, wire: &[u8]) -> Self {
        Self {
            kind: signal.kind().name(),
            index: signal.index(),
            value: signal_value(signal),
            wire: hex::encode_upper(wire),
        }
    }
}

/// Print one signal together with its wire bytes.
pub fn print_signal(signal: &Signal, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SignalOutput::new(signal, wire);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = SignalOutput::new(signal, wire);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "INDEX", "VALUE", "WIRE"])
                .add_row(vec![
                    out.kind.to_string(),
                    out.index.map(|i| i.to_string()).unwrap_or_default(),
                    value_text(&out.value),
                    out.wire,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let out = SignalOutput::new(signal, wire);
            match out.index {
                Some(index) => println!(
                    "{} index={} value={} wire={}",
                    out.kind,
                    index,
                    value_text(&out.value),
                    out.wire
                ),
                None => println!("{} wire={}", out.kind, out.wire),
            }
        }
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn signal_value(signal: &Signal) -> Value {
    match signal {
        Signal::Digital(t) => Value::Bool(t.value),
        Signal::Analog(t) => Value::from(t.value),
        Signal::Serial(t) => Value::String(payload_preview(&t.value)),
        Signal::Clear(_) | Signal::Refresh(_) => Value::Null,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {}>", hex::encode_upper(payload)),
    }
}

#[cfg(test)]
mod tests {
    use xsig_codec::{AnalogTransition, ClearOperation, SerialTransition, Wire};

    use super::*;

    fn json(signal: Signal) -> String {
        let wire = signal.to_bytes().unwrap();
        serde_json::to_string(&SignalOutput::new(&signal, &wire)).unwrap()
    }

    #[test]
    fn json_for_transitions() {
        assert_eq!(
            json(Signal::from(AnalogTransition::new(5, 100))),
            r#"{"kind":"analog","index":5,"value":100,"wire":"C0050064"}"#
        );
        assert_eq!(
            json(Signal::from(SerialTransition::new(2, &b"AB"[..]))),
            r#"{"kind":"serial","index":2,"value":"AB","wire":"C8024142FF"}"#
        );
    }

    #[test]
    fn json_for_operations_omits_index_and_value() {
        assert_eq!(
            json(Signal::from(ClearOperation)),
            r#"{"kind":"clear","wire":"FC"}"#
        );
    }

    #[test]
    fn binary_serial_payload_is_hex() {
        assert_eq!(payload_preview(&[0x80, 0xFE]), "<binary 80FE>");
    }
}
