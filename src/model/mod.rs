pub mod patch;
pub mod response;
pub mod villa;
pub mod villa_number;

pub use patch::*;
pub use response::*;
pub use villa::*;
pub use villa_number::*;
