pub mod stage;
pub mod task;
pub mod status;

pub use stage::*;
pub use task::*;
pub use status::*;
