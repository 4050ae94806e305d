// Author: Dustin Pilgrim
// License: MIT
//
// Single-pass scanner that finds the profile block describing exactly the
// currently connected outputs.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use crate::descriptor::extract_identifier;
use crate::error::{Result, StoreError};

/// A located `profile { ... }` block. Line numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileMatch {
    /// Line of the `profile ... {` header.
    pub start: usize,
    /// Line of the closing `}`.
    pub end: usize,
    pub name: Option<String>,
    /// Lines holding the block's `output` directives, ascending.
    pub output_lines: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The config file does not exist yet.
    Missing,
    /// The file exists but no block matches.
    Unmatched,
    Matched(ProfileMatch),
}

/// Classification of one line inside a profile block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// An `output` directive and the identifier it names.
    Output(&'a str),
    Other,
}

/// Parses `output "Desc (ID)" ...` and `output ID ...` alike.
pub fn parse_directive(line: &str) -> Directive<'_> {
    let Some(rest) = line.trim_start().strip_prefix("output") else {
        return Directive::Other;
    };
    if !rest.starts_with(char::is_whitespace) {
        return Directive::Other;
    }
    let rest = rest.trim_start();

    let raw = if let Some(quoted) = rest.strip_prefix('"') {
        match quoted.find('"') {
            Some(close) => &quoted[..close],
            None => return Directive::Other,
        }
    } else {
        match rest.split_whitespace().next() {
            Some(token) if !token.starts_with('#') => token,
            _ => return Directive::Other,
        }
    };

    match extract_identifier(raw) {
        "" => Directive::Other,
        id => Directive::Output(id),
    }
}

/// `Some(name)` when the line opens a profile block.
pub fn parse_profile_header(line: &str) -> Option<Option<String>> {
    let rest = line.trim().strip_prefix("profile")?;
    if !(rest.starts_with(char::is_whitespace) || rest.starts_with('{')) {
        return None;
    }

    let name = rest.strip_suffix('{')?.trim().trim_matches('"');
    if name.is_empty() {
        Some(None)
    } else {
        Some(Some(name.to_string()))
    }
}

fn is_closing_brace(line: &str) -> bool {
    line.trim_start().starts_with('}')
}

struct Candidate<'a> {
    start: usize,
    name: Option<String>,
    seen: HashSet<&'a str>,
    output_lines: Vec<usize>,
}

impl Candidate<'_> {
    fn new(start: usize, name: Option<String>) -> Self {
        Self {
            start,
            name,
            seen: HashSet::new(),
            output_lines: Vec::new(),
        }
    }

    fn finish(self, end: usize) -> ProfileMatch {
        ProfileMatch {
            start: self.start,
            end,
            name: self.name,
            output_lines: self.output_lines,
        }
    }
}

enum State<'a> {
    SeekingProfile,
    InProfile(Candidate<'a>),
    Done(ProfileMatch),
}

fn step<'a>(state: State<'a>, line: &str, line_no: usize, ids: &HashSet<&'a str>) -> State<'a> {
    match state {
        State::SeekingProfile => match parse_profile_header(line) {
            Some(name) => State::InProfile(Candidate::new(line_no, name)),
            None => State::SeekingProfile,
        },

        State::InProfile(mut cand) => {
            if is_closing_brace(line) {
                return if cand.seen.len() == ids.len() {
                    State::Done(cand.finish(line_no))
                } else {
                    State::SeekingProfile
                };
            }

            // previous block never closed
            if let Some(name) = parse_profile_header(line) {
                return State::InProfile(Candidate::new(line_no, name));
            }

            match parse_directive(line) {
                Directive::Other => State::InProfile(cand),
                Directive::Output(id) => {
                    // unknown or repeated outputs disqualify the block
                    let fresh = ids.get(id).is_some_and(|known| cand.seen.insert(*known));
                    if fresh {
                        cand.output_lines.push(line_no);
                        State::InProfile(cand)
                    } else {
                        State::SeekingProfile
                    }
                }
            }
        }

        done @ State::Done(_) => done,
    }
}

/// Returns the first block whose output identifiers are exactly `ids`.
pub fn scan_reader<'a, R: BufRead>(mut reader: R, ids: &HashSet<&'a str>) -> Result<Option<ProfileMatch>> {
    let mut state = State::SeekingProfile;
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        state = match step(state, &line, line_no, ids) {
            State::Done(found) => return Ok(Some(found)),
            next => next,
        };
    }
}

pub fn scan(path: &Path, ids: &HashSet<&str>) -> Result<ScanOutcome> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ScanOutcome::Missing),
        Err(source) => {
            return Err(StoreError::Open {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    Ok(match scan_reader(BufReader::new(file), ids)? {
        Some(found) => ScanOutcome::Matched(found),
        None => ScanOutcome::Unmatched,
    })
}
