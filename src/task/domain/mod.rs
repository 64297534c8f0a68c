//! Domain model for project tasks.

mod content;
mod error;
mod ids;
mod status;
mod task;

pub use content::TaskContent;
pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use status::{TaskPriority, TaskStatus};
pub use task::{AssignmentChange, PersistedTaskData, Task};
