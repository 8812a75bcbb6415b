// Core data models for the selection process configuration
// These structs represent the domain entities and their storage rows

pub mod stage;
pub mod task;
pub mod status;
pub mod rows;

pub use stage::*;
pub use task::*;
pub use status::*;
pub use rows::{RowError, StageRow, StatusRow, TaskRow};
