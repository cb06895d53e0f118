pub mod schema;
pub mod tracker;

pub use schema::*;
pub use tracker::*;
