// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use wdprofile_core::{Descriptor, ScanOutcome, StoreOutcome};

fn profile_label(name: Option<&str>) -> &str {
    name.unwrap_or("(unnamed)")
}

pub fn print_store_outcome(path: &Path, outcome: &StoreOutcome) {
    match outcome {
        StoreOutcome::Created => println!("created: {}", path.display()),
        StoreOutcome::Appended => println!("appended: {}", path.display()),
        StoreOutcome::Replaced { start, end, name } => println!(
            "replaced: {} (profile {}, lines {start}-{end})",
            path.display(),
            profile_label(name.as_deref())
        ),
    }
}

pub fn print_scan_outcome(path: &Path, outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Missing => println!("no config at {}", path.display()),
        ScanOutcome::Unmatched => println!("no matching profile"),
        ScanOutcome::Matched(m) => println!(
            "profile {}: lines {}-{}",
            profile_label(m.name.as_deref()),
            m.start,
            m.end
        ),
    }
}

pub fn print_descriptors(descriptors: &[Descriptor]) {
    if descriptors.is_empty() {
        println!("(no outputs connected)");
        return;
    }
    for d in descriptors {
        println!("{}", d.line);
    }
}
