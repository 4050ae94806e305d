// Author: Dustin Pilgrim
// License: MIT

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::scanner::{Directive, ProfileMatch, parse_directive};

const INDENT: &str = "    ";

/// `<path>.tmp`, next to the config so the final rename stays on one filesystem.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Appends a new profile block, creating the file (and its directory) if needed.
pub fn append_profile(path: &Path, name: Option<&str>, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut block = String::new();

    // blank separator, unless this is the first thing in the file
    if file.metadata()?.len() > 0 {
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            block.push('\n');
        }
        block.push('\n');
    }

    match name {
        Some(n) if n.contains(char::is_whitespace) => block.push_str(&format!("profile \"{n}\" {{\n")),
        Some(n) => block.push_str(&format!("profile {n} {{\n")),
        None => block.push_str("profile {\n"),
    }
    for line in lines {
        block.push_str(INDENT);
        block.push_str(line);
        block.push('\n');
    }
    block.push_str("}\n");

    file.write_all(block.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// A fully written temp file waiting to replace the config.
///
/// Dropping it without [`PendingRewrite::commit`] deletes the temp file and
/// leaves the config untouched.
#[derive(Debug)]
pub struct PendingRewrite {
    tmp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl PendingRewrite {
    pub fn temp_path(&self) -> &Path {
        &self.tmp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically swaps the temp file in.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingRewrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Streams `path` into its temp file with the matched block's output lines
/// replaced, one for one, by `lines`.
pub fn stage_replacement(path: &Path, found: &ProfileMatch, lines: &[String]) -> Result<PendingRewrite> {
    let expected = found.output_lines.len();
    if lines.len() != expected {
        return Err(StoreError::ReplacementCountMismatch {
            expected,
            found: lines.len(),
        });
    }

    // rewrite a symlinked config's target, not the link
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let source = File::open(&target).map_err(|source| StoreError::Open {
        path: target.clone(),
        source,
    })?;
    let permissions = source.metadata()?.permissions();

    let tmp = temp_path_for(&target);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)
        .map_err(|source| StoreError::CreateTemp {
            path: tmp.clone(),
            source,
        })?;

    let pending = PendingRewrite {
        tmp,
        target,
        committed: false,
    };

    let mut reader = BufReader::new(source);
    let mut out = BufWriter::new(file);
    let mut scheduled = found.output_lines.iter().copied().zip(lines).peekable();
    let mut replaced = 0;
    let mut line_no = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        match scheduled.peek() {
            Some(&(at, line)) if at == line_no => {
                // the file changed under us since the scan
                if matches!(parse_directive(&String::from_utf8_lossy(&buf)), Directive::Other) {
                    return Err(StoreError::ReplacementCountMismatch { expected, found: replaced });
                }

                out.write_all(INDENT.as_bytes())?;
                out.write_all(line.as_bytes())?;
                out.write_all(line_ending(&buf))?;

                replaced += 1;
                scheduled.next();
            }
            _ => out.write_all(&buf)?,
        }
    }

    if replaced != expected {
        return Err(StoreError::ReplacementCountMismatch { expected, found: replaced });
    }

    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    fs::set_permissions(&pending.tmp, permissions)?;

    Ok(pending)
}

pub fn replace_profile(path: &Path, found: &ProfileMatch, lines: &[String]) -> Result<()> {
    stage_replacement(path, found, lines)?.commit()
}

fn line_ending(line: &[u8]) -> &'static [u8] {
    if line.ends_with(b"\r\n") {
        b"\r\n"
    } else if line.ends_with(b"\n") {
        b"\n"
    } else {
        b""
    }
}
