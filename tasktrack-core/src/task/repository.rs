use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::task::aggregate::Task;
use crate::task::storage::{load_tasks, save_tasks, LoadedTasks};

/// Repository trait for task persistence.
///
/// The whole store is read and written at once: `load` returns every
/// record in order and `save` replaces them all.
pub trait TaskRepository {
    /// Load all tasks in stored order, skipping records that fail to parse.
    fn load(&self) -> Result<LoadedTasks>;

    /// Replace the stored tasks with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// Flat-file backed `TaskRepository` (`id|text|status` per line).
pub struct FileTaskRepository {
    path: PathBuf,
}

impl FileTaskRepository {
    pub fn new(path: PathBuf) -> Self {
        FileTaskRepository { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskRepository for FileTaskRepository {
    fn load(&self) -> Result<LoadedTasks> {
        load_tasks(&self.path)
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        save_tasks(&self.path, tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskId, TaskStatus};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileTaskRepository) {
        let dir = TempDir::new().unwrap();
        let repo = FileTaskRepository::new(dir.path().join("tasks.txt"));
        (dir, repo)
    }

    #[test]
    fn load_empty_when_file_absent() {
        let (_dir, repo) = setup();
        assert!(repo.load().unwrap().tasks.is_empty());
    }

    #[test]
    fn save_then_load() {
        let (dir, repo) = setup();
        let tasks = vec![
            Task::new(TaskId::new(1), "first").unwrap(),
            Task {
                id: TaskId::new(2),
                text: "second".to_string(),
                status: TaskStatus::Done,
            },
        ];
        repo.save(&tasks).unwrap();
        assert!(dir.path().join("tasks.txt").exists());
        assert_eq!(repo.load().unwrap().tasks, tasks);
    }

    #[test]
    fn load_reports_skipped_lines() {
        let (_dir, repo) = setup();
        fs::write(repo.path(), "1|ok|0\nnot a record\n").unwrap();
        let loaded = repo.load().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.skipped.len(), 1);
    }
}
