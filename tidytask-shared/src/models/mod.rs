/// Data records for TidyTask
///
/// Plain structs mirroring the three tables. They carry no storage logic;
/// reads and writes go through [`crate::store::Store`].
///
/// # Models
///
/// - `user`: accounts and credentials
/// - `category`: per-user colored labels
/// - `task`: tasks, their priority/status enums and status rules

pub mod category;
pub mod task;
pub mod user;

pub use category::{CreateCategory, TaskCategory, DEFAULT_CATEGORY_COLOR};
pub use task::{CreateTask, ParseEnumError, Priority, Task, TaskStatus, UpdateTask};
pub use user::{CreateUser, User};
