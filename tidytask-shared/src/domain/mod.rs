/// Task domain rules
///
/// Pure functions with no store access:
///
/// - `due_date`: accepted due date shapes
/// - `input`: validation of create/update input, per-entry-point priority policy
/// - `filter`: status/priority/category filtering
/// - `stats`: overdue detection and statistics

pub mod due_date;
pub mod filter;
pub mod input;
pub mod stats;

pub use filter::TaskFilter;
pub use input::{PriorityPolicy, TaskInput, TaskPatch};
pub use stats::TaskStats;
