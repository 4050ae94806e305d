// Author: Dustin Pilgrim
// License: MIT

pub mod descriptor;
pub mod error;
pub mod output;
pub mod scanner;
pub mod store;
pub mod writer;

pub use descriptor::{Descriptor, MAX_OUTPUTS, OutputNaming, describe_all, extract_identifier};
pub use error::{Result, StoreError};
pub use output::{OutputMode, OutputRecord, Transform};
pub use scanner::{Directive, ProfileMatch, ScanOutcome, parse_directive, scan, scan_reader};
pub use store::{StoreOptions, StoreOutcome, find_profile, store};
pub use writer::{PendingRewrite, append_profile, replace_profile, stage_replacement};
