use crate::addressing::RowSpan;
use crate::backend::wire;

/// Row insertion as a dimension request. `inherit_from_before` copies the
/// formatting of the row above the insertion point, which is only meaningful
/// when inserting after existing content.
pub fn build_insert_rows(sheet_id: i64, span: RowSpan, inherit_from_before: bool) -> wire::Request {
    wire::Request::InsertDimension(wire::InsertDimensionRequest {
        range: wire::DimensionRange {
            sheet_id,
            dimension: "ROWS".to_string(),
            start_index: span.start as i64,
            end_index: span.end as i64,
        },
        inherit_from_before: inherit_from_before && span.start > 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::{InsertAt, inserted_row_span};

    #[test]
    fn after_insertion_span_matches_dimension_range() {
        let span = inserted_row_span(4, 2, InsertAt::After);
        let request = build_insert_rows(7, span, true);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["insertDimension"]["range"]["startIndex"], 5);
        assert_eq!(value["insertDimension"]["range"]["endIndex"], 7);
        assert_eq!(value["insertDimension"]["inheritFromBefore"], true);
    }

    #[test]
    fn inherit_is_forced_off_at_the_top_of_the_sheet() {
        let span = inserted_row_span(0, 1, InsertAt::Before);
        let request = build_insert_rows(7, span, true);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["insertDimension"]["inheritFromBefore"], false);
    }
}
