pub mod partial_update;
pub mod patch;

pub use partial_update::Patchable;
pub use patch::*;
