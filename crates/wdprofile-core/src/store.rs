// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashSet;
use std::path::Path;

use crate::descriptor::{Descriptor, OutputNaming, describe_all};
use crate::error::{Result, StoreError};
use crate::output::OutputRecord;
use crate::scanner::{ScanOutcome, scan};
use crate::writer::{append_profile, replace_profile};

#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Naming convention for written `output` lines.
    pub naming: OutputNaming,
    /// Name given to newly appended profile blocks. Existing headers are kept.
    pub profile_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The config file did not exist and was created.
    Created,
    /// A new profile block was appended.
    Appended,
    /// An existing block's output lines were rewritten.
    Replaced {
        start: usize,
        end: usize,
        name: Option<String>,
    },
}

fn describe(records: &[OutputRecord], naming: OutputNaming) -> Result<Vec<Descriptor>> {
    if records.is_empty() {
        return Err(StoreError::NoOutputs);
    }
    describe_all(records, naming)
}

fn identifier_set(descriptors: &[Descriptor]) -> HashSet<&str> {
    descriptors.iter().map(|d| d.identifier.as_str()).collect()
}

/// Looks up the profile block matching `records` without writing anything.
///
/// Fails with [`StoreError::NoOutputs`] when `records` is empty.
pub fn find_profile(path: &Path, records: &[OutputRecord], naming: OutputNaming) -> Result<ScanOutcome> {
    let descriptors = describe(records, naming)?;
    scan(path, &identifier_set(&descriptors))
}

/// Saves the current output layout into the config at `path`.
///
/// A block listing exactly the same outputs is rewritten in place; otherwise
/// a new block is appended.
///
/// An empty `records` is refused with [`StoreError::NoOutputs`] before any
/// I/O; an empty `profile {}` block would never describe a real layout.
/// Names whose `output` line would not read back as the same identifier are
/// refused with [`StoreError::UnrepresentableOutput`].
pub fn store(path: &Path, records: &[OutputRecord], opts: &StoreOptions) -> Result<StoreOutcome> {
    let descriptors = describe(records, opts.naming)?;
    let lines: Vec<String> = descriptors.iter().map(|d| d.line.clone()).collect();
    let name = opts.profile_name.as_deref();

    match scan(path, &identifier_set(&descriptors))? {
        ScanOutcome::Missing => {
            append_profile(path, name, &lines)?;
            Ok(StoreOutcome::Created)
        }
        ScanOutcome::Unmatched => {
            append_profile(path, name, &lines)?;
            Ok(StoreOutcome::Appended)
        }
        ScanOutcome::Matched(found) => {
            replace_profile(path, &found, &lines)?;
            Ok(StoreOutcome::Replaced {
                start: found.start,
                end: found.end,
                name: found.name,
            })
        }
    }
}
