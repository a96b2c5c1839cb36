pub mod benchmark;
pub mod databases;
pub mod diana;
pub mod error;
pub mod metrics;

pub use benchmark::{config, data_generator, harness, report};
pub use databases::{dianadb, memory, mongodb, postgres};
pub use error::{BenchError, Result};
