/*
[INPUT]:  Individual type modules
[OUTPUT]: Unified task data model
[POS]:    Data layer - aggregates lifecycle states, task records and projections
[UPDATE]: When adding new type modules
*/

pub mod state;
pub mod task;
pub mod view;

pub use state::{PhotoSlot, TaskState};
pub use task::{PhotoRecord, Task, TaskId};
pub use view::{TaskSummary, TaskView};
