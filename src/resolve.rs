//! Sheet-name resolution against the backend's metadata.
//!
//! Resolution is per-call and uncached: every lookup pays one metadata
//! round-trip so it can never act on a sheet set made stale by a concurrent
//! rename or delete.

use crate::addressing::{GridSpan, parse_reference};
use crate::backend::{SpreadsheetBackend, SpreadsheetMetadata, wire};
use crate::errors::TranslationError;
use anyhow::Result;

/// What to do when a reference carries no sheet qualifier. The resolver
/// never guesses on its own; callers state their default explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFallback {
    /// Use the spreadsheet's first sheet.
    First,
    /// Use a sheet id already resolved earlier in the same command.
    Sheet(i64),
}

/// A span bound to a concrete backend sheet id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRegion {
    pub sheet_id: i64,
    pub span: GridSpan,
}

impl GridRegion {
    /// Convert to the backend's half-open range. Unbounded ends stay absent
    /// rather than being defaulted to a fixed constant.
    pub fn to_grid_range(&self) -> wire::GridRange {
        wire::GridRange {
            sheet_id: self.sheet_id,
            start_row_index: Some(self.span.start_row as i64),
            end_row_index: self.span.end_row.map(|r| r as i64 + 1),
            start_column_index: Some(self.span.start_col as i64),
            end_column_index: self.span.end_col.map(|c| c as i64 + 1),
        }
    }
}

/// One sheet's identity plus the grid bounds the builders use to close
/// unbounded spans.
#[derive(Debug, Clone)]
pub struct ResolvedSheet {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: Option<i64>,
    pub column_count: Option<i64>,
}

fn sheet_entry<'a>(
    metadata: &'a SpreadsheetMetadata,
    spreadsheet_id: &str,
    sheet_name: Option<&str>,
) -> Result<&'a wire::SheetProperties, TranslationError> {
    let properties = match sheet_name {
        // Exact, case-sensitive match; the backend treats titles as exact
        // identifiers and so do we.
        Some(name) => metadata
            .sheets
            .iter()
            .map(|s| &s.properties)
            .find(|p| p.title.as_deref() == Some(name))
            .ok_or_else(|| TranslationError::sheet_not_found(name, spreadsheet_id))?,
        None => metadata
            .sheets
            .first()
            .map(|s| &s.properties)
            .ok_or_else(|| TranslationError::sheet_not_found("<first>", spreadsheet_id))?,
    };
    Ok(properties)
}

fn resolved_from_properties(properties: &wire::SheetProperties) -> ResolvedSheet {
    let grid = properties.grid_properties.as_ref();
    ResolvedSheet {
        sheet_id: properties.sheet_id.unwrap_or_default(),
        title: properties.title.clone().unwrap_or_default(),
        row_count: grid.and_then(|g| g.row_count),
        column_count: grid.and_then(|g| g.column_count),
    }
}

/// Resolve one sheet (by name, or the first sheet when `sheet_name` is
/// absent) with a single metadata round-trip.
pub async fn resolve_sheet(
    backend: &dyn SpreadsheetBackend,
    spreadsheet_id: &str,
    sheet_name: Option<&str>,
) -> Result<ResolvedSheet> {
    let metadata = backend.spreadsheet_metadata(spreadsheet_id, false).await?;
    let properties = sheet_entry(&metadata, spreadsheet_id, sheet_name)?;
    Ok(resolved_from_properties(properties))
}

/// Resolve a sheet id only. A present name costs one metadata round-trip;
/// an absent name with a `Sheet` fallback costs none.
pub async fn resolve_sheet_id(
    backend: &dyn SpreadsheetBackend,
    spreadsheet_id: &str,
    sheet_name: Option<&str>,
    fallback: SheetFallback,
) -> Result<i64> {
    match (sheet_name, fallback) {
        (Some(name), _) => Ok(resolve_sheet(backend, spreadsheet_id, Some(name))
            .await?
            .sheet_id),
        (None, SheetFallback::Sheet(id)) => Ok(id),
        (None, SheetFallback::First) => Ok(resolve_sheet(backend, spreadsheet_id, None)
            .await?
            .sheet_id),
    }
}

/// Parse an A1 reference and bind it to a sheet id.
pub async fn resolve_region(
    backend: &dyn SpreadsheetBackend,
    spreadsheet_id: &str,
    reference: &str,
    fallback: SheetFallback,
) -> Result<GridRegion> {
    let parsed = parse_reference(reference)?;
    let sheet_id = resolve_sheet_id(
        backend,
        spreadsheet_id,
        parsed.sheet_name.as_deref(),
        fallback,
    )
    .await?;
    Ok(GridRegion {
        sheet_id,
        span: parsed.span,
    })
}

/// Like [`resolve_region`] but also returns the resolved sheet's identity,
/// for commands that go on to address the sheet by title (value writes) or
/// need its declared bounds. Always exactly one metadata round-trip.
pub async fn resolve_region_with_sheet(
    backend: &dyn SpreadsheetBackend,
    spreadsheet_id: &str,
    reference: &str,
) -> Result<(GridRegion, ResolvedSheet)> {
    let parsed = parse_reference(reference)?;
    let sheet = resolve_sheet(backend, spreadsheet_id, parsed.sheet_name.as_deref()).await?;
    Ok((
        GridRegion {
            sheet_id: sheet.sheet_id,
            span: parsed.span,
        },
        sheet,
    ))
}
