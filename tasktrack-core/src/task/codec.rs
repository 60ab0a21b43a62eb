use thiserror::Error;

use crate::task::aggregate::{validate_text, InvalidText, Task, TaskId, DELIMITER};
use crate::task::status::TaskStatus;

/// Why a persisted line could not be turned into a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid id '{0}'")]
    InvalidId(String),
    #[error("invalid status code '{0}'")]
    InvalidStatus(String),
    #[error("invalid text: {0}")]
    InvalidText(#[from] InvalidText),
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Integer code persisted for a status.
pub fn encode_status(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Pending => 0,
        TaskStatus::Done => 1,
        TaskStatus::InProgress => 2,
    }
}

/// Inverse of [`encode_status`].
pub fn decode_status(code: u8) -> Option<TaskStatus> {
    match code {
        0 => Some(TaskStatus::Pending),
        1 => Some(TaskStatus::Done),
        2 => Some(TaskStatus::InProgress),
        _ => None,
    }
}

/// Parse one `id|text|status` line (pure — no I/O).
///
/// A trailing `\r` is tolerated so files edited on Windows still load.
pub fn parse_line(line: &str) -> Result<Task, RecordError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    let [id, text, status] = fields[..] else {
        return Err(RecordError::FieldCount(fields.len()));
    };

    let id = id
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| RecordError::InvalidId(id.to_string()))?;
    let status = status
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(decode_status)
        .ok_or_else(|| RecordError::InvalidStatus(status.to_string()))?;
    validate_text(text)?;

    Ok(Task {
        id: TaskId::new(id),
        text: text.to_string(),
        status,
    })
}

/// Serialize a task as one line, including the trailing newline.
pub fn format_line(task: &Task) -> String {
    format!(
        "{}{DELIMITER}{}{DELIMITER}{}\n",
        task.id,
        task.text,
        encode_status(task.status)
    )
}
