// Author: Dustin Pilgrim
// License: MIT

use std::str::FromStr;

#[cfg(feature = "clap")]
use clap::ValueEnum;

use crate::error::{Result, StoreError};
use crate::output::OutputRecord;
use crate::scanner::{Directive, parse_directive};

/// Upper bound on outputs handled by one store call.
pub const MAX_OUTPUTS: usize = 10;

/// How `output` lines name their display when written.
///
/// Both forms are always accepted when reading.
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputNaming {
    /// `output DP-3 ...`
    #[default]
    Connector,
    /// `output "Dell Inc. DELL U2415 ABC (DP-3)" ...`
    Description,
}

impl FromStr for OutputNaming {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "connector" => Ok(OutputNaming::Connector),
            "description" => Ok(OutputNaming::Description),
            other => Err(format!(
                "expected connector|description, got \"{other}\""
            )),
        }
    }
}

/// Identifier and rendered config line for one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub identifier: String,
    pub line: String,
}

impl Descriptor {
    pub fn new(record: &OutputRecord, naming: OutputNaming) -> Self {
        Self {
            identifier: extract_identifier(&record.name).to_string(),
            line: render_line(record, naming),
        }
    }
}

/// Connector name embedded in a raw output string.
///
/// `"Dell Inc. DELL U2415 (DP-3)"` gives `DP-3`; a string without a
/// parenthesized suffix is its own identifier.
pub fn extract_identifier(raw: &str) -> &str {
    let raw = raw.trim();

    if let Some(body) = raw.strip_suffix(')') {
        if let Some(open) = body.rfind('(') {
            let inner = body[open + 1..].trim();
            if !inner.is_empty() {
                return inner;
            }
        }
    }

    raw
}

pub fn render_line(record: &OutputRecord, naming: OutputNaming) -> String {
    format!(
        "output {} position {},{} mode {}x{}@{} scale {:.2} transform {}",
        render_name(&record.name, naming),
        record.x,
        record.y,
        record.mode.width,
        record.mode.height,
        format_refresh(record.mode.refresh_mhz),
        record.scale,
        record.transform,
    )
}

pub fn describe_all(records: &[OutputRecord], naming: OutputNaming) -> Result<Vec<Descriptor>> {
    if records.len() > MAX_OUTPUTS {
        return Err(StoreError::TooManyOutputs {
            count: records.len(),
            max: MAX_OUTPUTS,
        });
    }

    records
        .iter()
        .map(|r| {
            let desc = Descriptor::new(r, naming);
            // a line the scanner can't read back would be appended again on every store
            if parse_directive(&desc.line) != Directive::Output(&desc.identifier) {
                return Err(StoreError::UnrepresentableOutput {
                    name: r.name.clone(),
                });
            }
            Ok(desc)
        })
        .collect()
}

fn render_name(raw: &str, naming: OutputNaming) -> String {
    match naming {
        OutputNaming::Connector => {
            let id = extract_identifier(raw);
            // a bare token can't carry whitespace or look like a comment
            if id.is_empty() || id.starts_with('#') || id.contains(char::is_whitespace) {
                quote(id)
            } else {
                id.to_string()
            }
        }
        OutputNaming::Description => quote(raw.trim()),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', ""))
}

// mHz -> Hz with four decimals, exact.
fn format_refresh(mhz: u32) -> String {
    format!("{}.{:03}0", mhz / 1000, mhz % 1000)
}
