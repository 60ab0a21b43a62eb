//! Use-case operations over a [`TaskRepository`].
//!
//! Every operation loads the whole store, applies one change in memory and
//! saves the store back only if something changed. Not-found and refused
//! transitions are ordinary [`Outcome`]s; only I/O failures, invalid text
//! and an exhausted id space surface as errors.
//!
//! Lines the last load had to skip are kept on the service so the caller can
//! report them; the next save drops them from the file.

use anyhow::Result;

use crate::task::{
    find_by_id, validate_text, SkippedLine, Task, TaskId, TaskRepository, TaskStatus,
    TransitionError,
};

/// Result of a mutating operation, rendered as the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(TaskId),
    Deleted(TaskId),
    Updated(TaskId),
    MarkedDone(TaskId),
    MarkedInProgress(TaskId),
    NotFound(TaskId),
    IllegalTransition { id: TaskId, error: TransitionError },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Added(id) => write!(f, "Task added with ID: {id}"),
            Outcome::Deleted(id) => write!(f, "Task deleted with ID: {id}"),
            Outcome::Updated(id) => write!(f, "Task at ID {id} updated."),
            Outcome::MarkedDone(id) => write!(f, "Task at ID {id} marked as Done."),
            Outcome::MarkedInProgress(id) => write!(f, "Task at ID {id} marked as In Progress."),
            Outcome::NotFound(id) => write!(f, "No task is found at ID: {id}"),
            Outcome::IllegalTransition { id, error } => write!(
                f,
                "Cannot move task at ID {id} from {} to {}: {}.",
                error.from.name(),
                error.to.name(),
                error.reason
            ),
        }
    }
}

/// Sort order for [`TaskService::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Text,
}

/// View parameters for [`TaskService::list`]. Filter and sort are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub status: Option<TaskStatus>,
    pub sort: Option<SortKey>,
}

impl ListQuery {
    /// Apply the filter, then the (stable) sort, to `tasks`.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        let mut view: Vec<Task> = match self.status {
            Some(status) => tasks.into_iter().filter(|t| t.status == status).collect(),
            None => tasks,
        };
        match self.sort {
            Some(SortKey::Id) => view.sort_by_key(|t| t.id),
            Some(SortKey::Text) => view.sort_by(|a, b| a.text.cmp(&b.text)),
            None => {}
        }
        view
    }
}

/// The operation layer. Owns the repository for the duration of a command.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    skipped: Vec<SkippedLine>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        TaskService {
            repo,
            skipped: Vec::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lines the most recent load could not parse.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    fn load(&mut self) -> Result<Vec<Task>> {
        let loaded = self.repo.load()?;
        self.skipped = loaded.skipped;
        Ok(loaded.tasks)
    }

    /// Append a new `Pending` task with id `max + 1` (or 1 on an empty store).
    pub fn add(&mut self, text: &str) -> Result<Outcome> {
        let mut tasks = self.load()?;
        let id = TaskId::next_after(&tasks)?;
        tasks.push(Task::new(id, text)?);
        self.repo.save(&tasks)?;
        tracing::info!(%id, "task added");
        Ok(Outcome::Added(id))
    }

    /// Remove every task with `id`. The store is not rewritten when none match.
    pub fn delete(&mut self, id: TaskId) -> Result<Outcome> {
        let mut tasks = self.load()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(Outcome::NotFound(id));
        }
        self.repo.save(&tasks)?;
        tracing::info!(%id, "task deleted");
        Ok(Outcome::Deleted(id))
    }

    /// Replace the text of the task with `id`, keeping its status.
    pub fn update_text(&mut self, id: TaskId, text: &str) -> Result<Outcome> {
        validate_text(text)?;
        let mut tasks = self.load()?;
        if find_by_id(&tasks, id).is_none() {
            return Ok(Outcome::NotFound(id));
        }
        for task in tasks.iter_mut().filter(|t| t.id == id) {
            task.rename(text)?;
        }
        self.repo.save(&tasks)?;
        tracing::info!(%id, "task updated");
        Ok(Outcome::Updated(id))
    }

    /// Move the task with `id` to `Done`.
    pub fn mark_done(&mut self, id: TaskId) -> Result<Outcome> {
        self.transition(id, TaskStatus::Done)
    }

    /// Move the task with `id` to `InProgress`.
    pub fn mark_in_progress(&mut self, id: TaskId) -> Result<Outcome> {
        self.transition(id, TaskStatus::InProgress)
    }

    /// Load the store and return the view selected by `query`.
    pub fn list(&mut self, query: ListQuery) -> Result<Vec<Task>> {
        let tasks = self.load()?;
        Ok(query.apply(tasks))
    }

    fn transition(&mut self, id: TaskId, to: TaskStatus) -> Result<Outcome> {
        let mut tasks = self.load()?;
        if find_by_id(&tasks, id).is_none() {
            return Ok(Outcome::NotFound(id));
        }
        let mut changed = false;
        let mut refused: Option<TransitionError> = None;

        // Ids are unique in normal operation; every match is still evaluated.
        for task in tasks.iter_mut().filter(|t| t.id == id) {
            let applied = match to {
                TaskStatus::Done => task.complete(),
                TaskStatus::InProgress => task.start(),
                TaskStatus::Pending => Err(TransitionError::new(task.status, to)),
            };
            match applied {
                Ok(()) => changed = true,
                Err(error) => {
                    tracing::debug!(%id, %error, "transition refused");
                    if refused.is_none() {
                        refused = Some(error);
                    }
                }
            }
        }

        if changed {
            self.repo.save(&tasks)?;
            tracing::info!(%id, status = %to, "task status changed");
        }
        Ok(match (refused, to) {
            (Some(error), _) => Outcome::IllegalTransition { id, error },
            (None, TaskStatus::InProgress) => Outcome::MarkedInProgress(id),
            (None, _) => Outcome::MarkedDone(id),
        })
    }
}
