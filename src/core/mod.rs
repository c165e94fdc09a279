pub mod batch;
pub mod convert;

pub use batch::{BatchEnricher, BatchOptions};
pub use convert::FormatConverter;
