//! Line-oriented range counting over an ordered set.
//!
//! Input is a stream of whitespace-separated commands: `k <value>` inserts a
//! value and `q <a> <b>` prints how many stored values fall in `[a, b]`.
pub mod container;
pub mod driver;
pub mod error;
pub mod parser;

pub use container::{range_query, Container};
pub use driver::{driver, run};
pub use error::DriverError;
