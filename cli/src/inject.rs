#![deny(missing_docs)]

//! # Inject Command
//!
//! Runs the rewrite over the requested inputs.
//!
//! 1. **Discovery**: a single file, or every file under a directory whose name
//!    ends with the configured suffix.
//! 2. **Rewrite**: each file goes through [`rewrite_source`] independently.
//! 3. **Write-back**: changed files are replaced atomically; unchanged files are
//!    not touched. In dry-run mode the result goes to stdout instead.

use crate::error::{CliError, CliResult};
use goinject_core::{rewrite_source, Options};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Outcome for one processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// The processed file.
    pub path: PathBuf,
    /// Directives found.
    pub directives: usize,
    /// Edits applied.
    pub edits: usize,
    /// Directives dropped as malformed.
    pub dropped: usize,
    /// Whether the file content changed.
    pub changed: bool,
}

/// Outcome for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Per-file outcomes, in processing order.
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// Number of files whose content changed.
    pub fn changed(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }
}

/// Lists the files to process.
///
/// A file path is taken as is. A directory is walked recursively for files whose
/// name ends with `suffix`, sorted by path.
pub fn collect_inputs(input: &Path, suffix: &str) -> CliResult<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(CliError::General(format!(
            "Input not found: {}",
            input.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if entry.file_type().is_file() && matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Rewrites one file in place, or prints the result when `dry_run` is set.
pub fn inject_file(path: &Path, options: &Options, dry_run: bool) -> CliResult<FileReport> {
    let source = fs::read_to_string(path)?;
    let rewrite = rewrite_source(&source, options).map_err(|error| CliError::Rewrite {
        path: path.to_path_buf(),
        error,
    })?;

    info!(
        path:? = path,
        directives = rewrite.directives,
        edits = rewrite.edits,
        dropped = rewrite.dropped;
        "Processed file"
    );

    if dry_run {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rewrite.output.as_bytes())?;
        stdout.flush()?;
    } else if rewrite.changed {
        write_atomic(path, &rewrite.output)?;
    } else {
        debug!(path:? = path; "No changes, leaving file untouched");
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        directives: rewrite.directives,
        edits: rewrite.edits,
        dropped: rewrite.dropped,
        changed: rewrite.changed,
    })
}

/// Processes every input under `input`, stopping at the first failure.
pub fn run(input: &Path, suffix: &str, options: &Options, dry_run: bool) -> CliResult<RunReport> {
    let files = collect_inputs(input, suffix)?;
    if files.is_empty() {
        info!(input:? = input, suffix; "No matching files");
    }

    let mut report = RunReport::default();
    for path in files {
        report.files.push(inject_file(&path, options, dry_run)?);
    }
    Ok(report)
}

/// Writes `report` as pretty JSON to `path`.
pub fn write_report(path: &Path, report: &RunReport) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json + "\n")?;
    Ok(())
}

/// Replaces `path` with `content` through a temp file in the same directory,
/// keeping the original permissions.
fn write_atomic(path: &Path, content: &str) -> CliResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(path).map_err(|e| CliError::Io(e.error))?;
    Ok(())
}
