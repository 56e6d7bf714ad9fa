pub mod sink;

pub use sink::{init, TIMESTAMP_FORMAT};
