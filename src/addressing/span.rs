use super::a1::GridSpan;
use serde_json::Value;

/// Where inserted rows land relative to the anchor's first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Before,
    After,
}

/// Half-open row interval, matching the backend's dimension ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub start: u32,
    pub end: u32,
}

impl RowSpan {
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compute where `count` inserted rows land. `Before` inserts immediately
/// above the anchor's first row, `After` immediately below it.
pub fn inserted_row_span(anchor_start_row: u32, count: u32, at: InsertAt) -> RowSpan {
    let start = match at {
        InsertAt::Before => anchor_start_row,
        InsertAt::After => anchor_start_row + 1,
    };
    RowSpan {
        start,
        end: start + count,
    }
}

/// Region covered by a payload written at the given origin. Ragged rows are
/// allowed; the region is as wide as the longest row, shorter rows are not
/// padded.
pub fn fill_region(origin_row: u32, origin_col: u32, payload: &[Vec<Value>]) -> GridSpan {
    let height = payload.len().max(1) as u32;
    let width = payload
        .iter()
        .map(|row| row.len())
        .max()
        .unwrap_or(1)
        .max(1) as u32;

    GridSpan {
        start_row: origin_row,
        end_row: Some(origin_row + height - 1),
        start_col: origin_col,
        end_col: Some(origin_col + width - 1),
    }
}
