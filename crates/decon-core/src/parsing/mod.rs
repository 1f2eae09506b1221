pub mod header;
pub mod normalize;
pub mod values;

pub use header::{validate_columns, ColumnCheck};
