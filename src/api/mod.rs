pub mod envelope;
pub mod handlers;
pub mod routes;
pub mod villa_handlers;
pub mod villa_number_handlers;

pub use handlers::*;
pub use routes::*;
