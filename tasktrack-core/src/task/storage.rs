use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::task::aggregate::{Task, TaskId};
use crate::task::codec::{format_line, parse_line, RecordError};

/// A persisted line that failed to parse and was dropped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the file.
    pub line_no: usize,
    pub content: String,
    pub error: RecordError,
}

impl std::fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line_no, self.error)
    }
}

/// Result of loading a task file: the records that parsed, in file order,
/// plus the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse task file content (pure — no I/O).
///
/// Each line is decoded on its own, so a stray non-UTF-8 byte only costs
/// the line it sits on. Blank lines are ignored. Lines that fail to parse
/// are collected in `skipped` and loading continues with the next line.
pub fn parse_tasks(content: &[u8]) -> LoadedTasks {
    let mut loaded = LoadedTasks::default();
    for (idx, raw) in content.split(|&b| b == b'\n').enumerate() {
        let parsed = match std::str::from_utf8(raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_line(line),
            Err(_) => Err(RecordError::InvalidUtf8),
        };
        match parsed {
            Ok(task) => loaded.tasks.push(task),
            Err(error) => {
                let skipped = SkippedLine {
                    line_no: idx + 1,
                    content: String::from_utf8_lossy(raw).into_owned(),
                    error,
                };
                tracing::debug!(line = skipped.line_no, error = %skipped.error, "skipping malformed line");
                loaded.skipped.push(skipped);
            }
        }
    }
    loaded
}

/// Read the task file at `path`.
///
/// A missing file is an empty store, not an error.
pub fn load_tasks(path: &Path) -> Result<LoadedTasks> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "task file missing, starting empty");
            return Ok(LoadedTasks::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let loaded = parse_tasks(&content);
    tracing::debug!(
        path = %path.display(),
        tasks = loaded.tasks.len(),
        skipped = loaded.skipped.len(),
        "loaded tasks"
    );
    Ok(loaded)
}

/// Serialize tasks in order, one line each.
pub fn format_tasks(tasks: &[Task]) -> String {
    tasks.iter().map(format_line).collect()
}

/// Replace the task file at `path` with exactly `tasks`.
///
/// The content goes to a sibling temp file which is synced and then renamed
/// over `path`, so readers see either the old file or the new one in full.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    atomic_write(path, &format_tasks(tasks))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), tasks = tasks.len(), "saved tasks");
    Ok(())
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    // Same directory keeps the rename on one filesystem.
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    let result = write_synced(&tmp, content).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_synced(path: &Path, content: &str) -> io::Result<()> {
    let mut f = fs::File::create(path)?;
    f.write_all(content.as_bytes())?;
    f.sync_all()
}

/// First task with the given id, scanning in file order.
pub fn find_by_id(tasks: &[Task], id: TaskId) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}
