// Registries: validated, persisted collections of the configuration entities.
// Each registry borrows one connection and is constructed once per session.

pub mod stage;
pub mod task;
pub mod status;

pub use stage::StageRegistry;
pub use task::TaskRegistry;
pub use status::{StatusRegistry, WorkingCopy};
