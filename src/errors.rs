use thiserror::Error;

/// Failures raised while translating caller addressing into backend
/// coordinates. These are detected before any backend dispatch.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("invalid range '{reference}': {reason}")]
    InvalidRange { reference: String, reason: String },

    #[error("sheet '{name}' not found in spreadsheet '{spreadsheet_id}'")]
    SheetNotFound {
        name: String,
        spreadsheet_id: String,
    },

    #[error("payload has {actual} row(s) but range '{range}' spans {expected}")]
    ValueShapeMismatch {
        range: String,
        expected: u32,
        actual: u32,
    },

    #[error("chart {chart_id} not found in spreadsheet '{spreadsheet_id}'")]
    ChartNotFound {
        chart_id: i64,
        spreadsheet_id: String,
    },
}

impl TranslationError {
    pub fn invalid_range(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn sheet_not_found(name: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self::SheetNotFound {
            name: name.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    pub fn chart_not_found(chart_id: i64, spreadsheet_id: impl Into<String>) -> Self {
        Self::ChartNotFound {
            chart_id,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}
