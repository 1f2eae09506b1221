pub mod aggregate;
pub mod engine;
pub mod outcome;

pub use aggregate::{aggregate, summarize, ResultAggregator};
pub use engine::deconstruct_row;
