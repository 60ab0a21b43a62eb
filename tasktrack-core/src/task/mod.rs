pub mod aggregate;
pub mod codec;
pub mod repository;
pub mod status;
pub mod storage;

pub use aggregate::{validate_text, IdExhausted, InvalidText, Task, TaskId, DELIMITER};
pub use codec::{decode_status, encode_status, format_line, parse_line, RecordError};
pub use repository::{FileTaskRepository, TaskRepository};
pub use status::{TaskStatus, TransitionError};
pub use storage::{find_by_id, load_tasks, save_tasks, LoadedTasks, SkippedLine};
