use thiserror::Error;

use crate::task::status::{TaskStatus, TransitionError};

/// Field delimiter of the persisted line format.
pub const DELIMITER: char = '|';

/// Positive numeric identifier of a task, unique within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn new(id: u64) -> Self {
        TaskId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id Add assigns next: one past the largest existing id, or 1.
    pub fn next_after<'a>(
        tasks: impl IntoIterator<Item = &'a Task>,
    ) -> Result<TaskId, IdExhausted> {
        let max = tasks.into_iter().map(|t| t.id.0).max().unwrap_or(0);
        max.checked_add(1).map(TaskId).ok_or(IdExhausted(TaskId(max)))
    }
}

/// The store already holds the largest representable id, so Add has none left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no task id left after {0}")]
pub struct IdExhausted(pub TaskId);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        TaskId(id)
    }
}

/// Task text that cannot be stored without breaking the line format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidText {
    #[error("task text is empty")]
    Empty,
    #[error("task text must not contain '|'")]
    ContainsDelimiter,
    #[error("task text must not contain line breaks")]
    ContainsLineBreak,
}

/// Check that `text` can be persisted as a single field of a single line.
pub fn validate_text(text: &str) -> Result<(), InvalidText> {
    if text.trim().is_empty() {
        return Err(InvalidText::Empty);
    }
    if text.contains(DELIMITER) {
        return Err(InvalidText::ContainsDelimiter);
    }
    if text.contains(['\n', '\r']) {
        return Err(InvalidText::ContainsLineBreak);
    }
    Ok(())
}

/// Domain aggregate: a tracked item with enforced status transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub status: TaskStatus,
}

impl Task {
    /// Create a fresh `Pending` task, rejecting text the store cannot hold.
    pub fn new(id: TaskId, text: impl Into<String>) -> Result<Self, InvalidText> {
        let text = text.into();
        validate_text(&text)?;
        Ok(Task {
            id,
            text,
            status: TaskStatus::Pending,
        })
    }

    /// Replace the text, leaving the status alone.
    pub fn rename(&mut self, text: impl Into<String>) -> Result<(), InvalidText> {
        let text = text.into();
        validate_text(&text)?;
        self.text = text;
        Ok(())
    }

    /// Transition to `InProgress`.
    ///
    /// Only `Pending` tasks can be started.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.transition(TaskStatus::InProgress)?;
        Ok(())
    }

    /// Transition to `Done` from `Pending` or `InProgress`.
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.transition(TaskStatus::Done)?;
        Ok(())
    }
}
