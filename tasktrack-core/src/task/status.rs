use thiserror::Error;

/// Lifecycle state of a task.
///
/// State machine:
/// ```text
/// Pending ──start()────▶ InProgress ──complete()──▶ Done
///         ──complete()─────────────────────────────▶ Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

/// A status change the state machine refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move from {} to {}: {reason}", .from.name(), .to.name())]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
    /// Short operator-facing explanation of why the move was refused.
    pub reason: &'static str,
}

impl TransitionError {
    pub fn new(from: TaskStatus, to: TaskStatus) -> Self {
        let reason = match (from, to) {
            (TaskStatus::Done, _) => "task already completed",
            (TaskStatus::InProgress, TaskStatus::InProgress) => "task already in progress",
            _ => "transition not allowed",
        };
        TransitionError { from, to, reason }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
        }
    }

    /// Human-readable status name.
    pub fn name(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Checkbox shown in list views.
    pub fn checkbox(&self) -> &'static str {
        match self {
            TaskStatus::Done => "[x]",
            TaskStatus::Pending | TaskStatus::InProgress => "[ ]",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        matches!(
            (self, to),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::Pending, TaskStatus::Done)
                | (TaskStatus::InProgress, TaskStatus::Done)
        )
    }

    /// Resolve a move to `to`, returning the new status or the refusal.
    ///
    /// Every status change goes through here; nothing assigns `status`
    /// directly outside of construction and decoding.
    pub fn transition(self, to: TaskStatus) -> Result<TaskStatus, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError::new(self, to))
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
