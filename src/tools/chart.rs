use crate::backend::wire;
use crate::builders::chart::{
    ChartUpdate, ResolvedSeries, build_basic_spec, build_pie_spec, merge_chart_update,
};
use crate::errors::TranslationError;
use crate::resolve::{GridRegion, SheetFallback, resolve_region};
use crate::state::AppState;
use crate::tools::param_enums::{ChartKind, TargetAxis};
use anyhow::{Result, anyhow, bail};
use futures::future::try_join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SeriesSpec {
    /// A1 range holding the series values, e.g. `Sheet1!B2:B10`.
    pub range: String,
    #[serde(default)]
    pub target_axis: Option<TargetAxis>,
    /// Per-series render type, only meaningful on combo charts.
    #[serde(default)]
    pub chart_type: Option<ChartKind>,
}

/// Bind every series range to a sheet id. Ranges resolve concurrently; each
/// unqualified range falls back to the first sheet.
async fn resolve_series(
    state: &AppState,
    spreadsheet_id: &str,
    series: &[SeriesSpec],
) -> Result<Vec<ResolvedSeries>> {
    let backend = state.backend();
    let resolved = try_join_all(series.iter().map(|spec| {
        let backend = backend.clone();
        async move {
            let region = resolve_region(
                backend.as_ref(),
                spreadsheet_id,
                &spec.range,
                SheetFallback::First,
            )
            .await?;
            Ok::<_, anyhow::Error>(ResolvedSeries {
                region,
                target_axis: spec.target_axis,
                render_type: spec.chart_type,
            })
        }
    }))
    .await?;
    Ok(resolved)
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateChartParams {
    pub spreadsheet_id: String,
    pub chart_type: ChartKind,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub title: Option<String>,
    /// A1 range supplying the label domain. Defaults to column A over the
    /// first series' rows.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub legend_position: Option<String>,
    #[serde(default)]
    pub header_count: Option<i64>,
    /// A1 cell the chart is anchored to. When absent the chart is placed on
    /// its own new sheet.
    #[serde(default)]
    pub anchor_cell: Option<String>,
    /// Pie only: fraction of the radius cut out of the center.
    #[serde(default)]
    pub pie_hole: Option<f64>,
    /// Pie only.
    #[serde(default)]
    pub three_dimensional: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreateChartResponse {
    pub chart_id: i64,
    pub chart_type: String,
    pub spreadsheet_id: String,
}

pub async fn create_chart(
    state: Arc<AppState>,
    params: CreateChartParams,
) -> Result<CreateChartResponse> {
    if params.series.is_empty() {
        bail!("at least one series is required");
    }
    if params.chart_type.is_pie() && params.series.len() != 1 {
        bail!(
            "pie charts take exactly one series, got {}",
            params.series.len()
        );
    }

    let series = resolve_series(&state, &params.spreadsheet_id, &params.series).await?;

    let backend = state.backend();
    let explicit_domain = match &params.domain {
        Some(reference) => Some(
            resolve_region(
                backend.as_ref(),
                &params.spreadsheet_id,
                reference,
                // Unqualified domains follow the first series' sheet.
                SheetFallback::Sheet(series[0].region.sheet_id),
            )
            .await?,
        ),
        None => None,
    };

    let spec = if params.chart_type.is_pie() {
        build_pie_spec(
            params.title.as_deref(),
            &series[0].region,
            explicit_domain.as_ref(),
            params.legend_position.as_deref(),
            params.pie_hole,
            params.three_dimensional,
        )
    } else {
        build_basic_spec(
            params.chart_type,
            params.title.as_deref(),
            &series,
            explicit_domain.as_ref(),
            params.legend_position.as_deref(),
            params.header_count,
        )?
    };

    let position = chart_position(
        backend.as_ref(),
        &params.spreadsheet_id,
        params.anchor_cell.as_deref(),
        series[0].region.sheet_id,
    )
    .await?;

    let request = wire::Request::AddChart(wire::AddChartRequest {
        chart: wire::EmbeddedChart {
            chart_id: None,
            spec,
            position: Some(position),
        },
    });

    let reply = backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    let chart_id = reply
        .replies
        .first()
        .and_then(|r| r.add_chart.as_ref())
        .and_then(|r| r.chart.chart_id)
        .ok_or_else(|| anyhow!("backend reply did not include the created chart"))?;

    Ok(CreateChartResponse {
        chart_id,
        chart_type: params.chart_type.as_str().to_string(),
        spreadsheet_id: reply.spreadsheet_id,
    })
}

async fn chart_position(
    backend: &dyn crate::backend::SpreadsheetBackend,
    spreadsheet_id: &str,
    anchor_cell: Option<&str>,
    default_sheet_id: i64,
) -> Result<wire::EmbeddedObjectPosition> {
    let Some(anchor) = anchor_cell else {
        return Ok(wire::EmbeddedObjectPosition {
            overlay_position: None,
            new_sheet: Some(true),
        });
    };

    let region = resolve_region(
        backend,
        spreadsheet_id,
        anchor,
        SheetFallback::Sheet(default_sheet_id),
    )
    .await?;

    Ok(wire::EmbeddedObjectPosition {
        overlay_position: Some(wire::OverlayPosition {
            anchor_cell: wire::GridCoordinate {
                sheet_id: region.sheet_id,
                row_index: Some(region.span.start_row as i64),
                column_index: Some(region.span.start_col as i64),
            },
            ..wire::OverlayPosition::default()
        }),
        new_sheet: None,
    })
}

/// Locate an embedded chart by id in already-fetched metadata.
fn find_chart<'a>(
    metadata: &'a crate::backend::SpreadsheetMetadata,
    chart_id: i64,
) -> Option<&'a wire::EmbeddedChart> {
    metadata
        .sheets
        .iter()
        .flat_map(|sheet| sheet.charts.iter())
        .find(|chart| chart.chart_id == Some(chart_id))
}

/// Sheet the chart's data already reads from, taken from its existing spec.
fn chart_sheet_id(spec: &wire::ChartSpec) -> Option<i64> {
    let from_data = |data: &wire::ChartData| {
        data.source_range
            .as_ref()
            .and_then(|range| range.sources.first())
            .map(|source| source.sheet_id)
    };

    if let Some(basic) = &spec.basic_chart {
        return basic
            .series
            .first()
            .and_then(|series| from_data(&series.series))
            .or_else(|| basic.domains.first().and_then(|d| from_data(&d.domain)));
    }
    spec.pie_chart.as_ref().and_then(|pie| {
        pie.series
            .as_ref()
            .and_then(from_data)
            .or_else(|| pie.domain.as_ref().and_then(from_data))
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateChartParams {
    pub spreadsheet_id: String,
    pub chart_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    /// Must stay within the chart's current family; switching between pie
    /// and categorical requires delete and recreate.
    #[serde(default)]
    pub chart_type: Option<ChartKind>,
    #[serde(default)]
    pub legend_position: Option<String>,
    /// Replaces the full series list when present.
    #[serde(default)]
    pub series: Option<Vec<SeriesSpec>>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub header_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UpdateChartResponse {
    pub chart_id: i64,
    pub spreadsheet_id: String,
}

/// Read-modify-write: fetch the chart's current spec, overlay only the
/// fields the caller supplied, and write the merged spec back.
pub async fn update_chart(
    state: Arc<AppState>,
    params: UpdateChartParams,
) -> Result<UpdateChartResponse> {
    let backend = state.backend();
    let metadata = backend
        .spreadsheet_metadata(&params.spreadsheet_id, true)
        .await?;
    let existing = find_chart(&metadata, params.chart_id).ok_or_else(|| {
        TranslationError::chart_not_found(params.chart_id, &params.spreadsheet_id)
    })?;

    let series = match &params.series {
        Some(specs) => {
            if specs.is_empty() {
                bail!("series must not be empty when present");
            }
            Some(resolve_series(&state, &params.spreadsheet_id, specs).await?)
        }
        None => None,
    };

    let domain = match &params.domain {
        Some(reference) => {
            // An unqualified domain follows the incoming series if any,
            // otherwise the sheet the chart already reads from.
            let fallback = series
                .as_ref()
                .and_then(|s| s.first())
                .map(|s| SheetFallback::Sheet(s.region.sheet_id))
                .or_else(|| chart_sheet_id(&existing.spec).map(SheetFallback::Sheet))
                .unwrap_or(SheetFallback::First);
            Some(
                resolve_region(backend.as_ref(), &params.spreadsheet_id, reference, fallback)
                    .await?,
            )
        }
        None => None,
    };

    let merged = merge_chart_update(
        &existing.spec,
        &ChartUpdate {
            title: params.title.clone(),
            chart_type: params.chart_type,
            legend_position: params.legend_position.clone(),
            series,
            domain,
            header_count: params.header_count,
        },
    )?;

    let request = wire::Request::UpdateChartSpec(wire::UpdateChartSpecRequest {
        chart_id: params.chart_id,
        spec: merged,
    });
    let reply = backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    Ok(UpdateChartResponse {
        chart_id: params.chart_id,
        spreadsheet_id: reply.spreadsheet_id,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteChartParams {
    pub spreadsheet_id: String,
    pub chart_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteChartResponse {
    pub deleted_chart_id: i64,
}

pub async fn delete_chart(
    state: Arc<AppState>,
    params: DeleteChartParams,
) -> Result<DeleteChartResponse> {
    let request = wire::Request::DeleteEmbeddedObject(wire::DeleteEmbeddedObjectRequest {
        object_id: params.chart_id,
    });
    state
        .backend()
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    Ok(DeleteChartResponse {
        deleted_chart_id: params.chart_id,
    })
}
