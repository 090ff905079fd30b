pub mod members;
pub mod models;
pub mod palette;
pub mod routes;

pub use models::*;
