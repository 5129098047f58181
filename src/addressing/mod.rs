pub mod a1;
pub mod span;

pub use a1::{GridSpan, ParsedReference, column_index, column_letters, parse_reference};
pub use span::{InsertAt, RowSpan, fill_region, inserted_row_span};
