//! Database module for PostgreSQL persistence.

mod operations;
mod pool;
mod records;

pub use operations::*;
pub use pool::*;
pub use records::*;
