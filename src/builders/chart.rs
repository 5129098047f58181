//! Chart spec construction and read-modify-write updates.
//!
//! Two chart families share one entry point: the proportional (pie) family
//! takes exactly one value series, the categorical (basic) family takes one
//! or more independently-addressed series. A missing label domain is derived
//! rather than required: the series' row span replayed against column A of
//! the resolved sheet (for the categorical family, the *first* series' row
//! span — all series are assumed row-aligned with it).

use crate::backend::wire;
use crate::resolve::GridRegion;
use crate::tools::param_enums::{ChartKind, TargetAxis};
use anyhow::{Result, bail};

/// A series whose source range has already been bound to a sheet id.
#[derive(Debug, Clone)]
pub struct ResolvedSeries {
    pub region: GridRegion,
    pub target_axis: Option<TargetAxis>,
    pub render_type: Option<ChartKind>,
}

/// Legend tokens are commonly supplied without the backend's `_LEGEND`
/// suffix; normalize instead of rejecting.
pub fn normalize_legend_position(token: &str) -> String {
    let upper = token.trim().to_ascii_uppercase().replace([' ', '-'], "_");
    if upper.ends_with("_LEGEND") {
        upper
    } else {
        format!("{upper}_LEGEND")
    }
}

/// Default label domain: the series' row span against column A of the same
/// sheet. Unbounded row bounds survive the derivation.
pub fn derive_label_domain(series: &GridRegion) -> GridRegion {
    GridRegion {
        sheet_id: series.sheet_id,
        span: crate::addressing::GridSpan {
            start_row: series.span.start_row,
            end_row: series.span.end_row,
            start_col: 0,
            end_col: Some(0),
        },
    }
}

pub fn build_pie_spec(
    title: Option<&str>,
    series: &GridRegion,
    explicit_domain: Option<&GridRegion>,
    legend_position: Option<&str>,
    pie_hole: Option<f64>,
    three_dimensional: Option<bool>,
) -> wire::ChartSpec {
    // An explicit domain wins outright; otherwise derive one.
    let domain = explicit_domain
        .copied()
        .unwrap_or_else(|| derive_label_domain(series));

    wire::ChartSpec {
        title: title.map(str::to_string),
        basic_chart: None,
        pie_chart: Some(wire::PieChartSpec {
            legend_position: legend_position.map(normalize_legend_position),
            domain: Some(wire::ChartData::from_range(domain.to_grid_range())),
            series: Some(wire::ChartData::from_range(series.to_grid_range())),
            pie_hole,
            three_dimensional,
        }),
    }
}

pub fn build_basic_spec(
    chart_type: ChartKind,
    title: Option<&str>,
    series: &[ResolvedSeries],
    explicit_domain: Option<&GridRegion>,
    legend_position: Option<&str>,
    header_count: Option<i64>,
) -> Result<wire::ChartSpec> {
    let Some(first) = series.first() else {
        bail!("at least one series is required");
    };

    let domain = explicit_domain
        .copied()
        .unwrap_or_else(|| derive_label_domain(&first.region));

    let series = series
        .iter()
        .map(|s| wire::BasicChartSeries {
            series: wire::ChartData::from_range(s.region.to_grid_range()),
            target_axis: s.target_axis.map(|a| a.to_wire().to_string()),
            render_type: s.render_type.map(|k| k.to_wire().to_string()),
        })
        .collect();

    Ok(wire::ChartSpec {
        title: title.map(str::to_string),
        basic_chart: Some(wire::BasicChartSpec {
            chart_type: chart_type.to_wire().to_string(),
            legend_position: legend_position.map(normalize_legend_position),
            domains: vec![wire::BasicChartDomain {
                domain: wire::ChartData::from_range(domain.to_grid_range()),
            }],
            series,
            header_count,
        }),
        pie_chart: None,
    })
}

/// Fields an update may touch. Anything left `None` keeps the existing
/// chart's value.
#[derive(Debug, Clone, Default)]
pub struct ChartUpdate {
    pub title: Option<String>,
    pub chart_type: Option<ChartKind>,
    pub legend_position: Option<String>,
    pub series: Option<Vec<ResolvedSeries>>,
    pub domain: Option<GridRegion>,
    pub header_count: Option<i64>,
}

/// Overlay an update onto the chart's existing spec. The spec is never
/// rebuilt from scratch: attributes the update does not mention (axes,
/// untouched series, positioning) pass through verbatim.
pub fn merge_chart_update(existing: &wire::ChartSpec, update: &ChartUpdate) -> Result<wire::ChartSpec> {
    let mut merged = existing.clone();

    if let Some(title) = &update.title {
        merged.title = Some(title.clone());
    }

    match (&mut merged.basic_chart, &mut merged.pie_chart) {
        (Some(basic), None) => {
            if let Some(kind) = update.chart_type {
                if kind.is_pie() {
                    bail!("cannot change a categorical chart into a pie chart; delete and recreate it");
                }
                basic.chart_type = kind.to_wire().to_string();
            }
            if let Some(legend) = &update.legend_position {
                basic.legend_position = Some(normalize_legend_position(legend));
            }
            if let Some(series) = &update.series {
                basic.series = series
                    .iter()
                    .map(|s| wire::BasicChartSeries {
                        series: wire::ChartData::from_range(s.region.to_grid_range()),
                        target_axis: s.target_axis.map(|a| a.to_wire().to_string()),
                        render_type: s.render_type.map(|k| k.to_wire().to_string()),
                    })
                    .collect();
            }
            if let Some(domain) = &update.domain {
                basic.domains = vec![wire::BasicChartDomain {
                    domain: wire::ChartData::from_range(domain.to_grid_range()),
                }];
            }
            if let Some(header_count) = update.header_count {
                basic.header_count = Some(header_count);
            }
        }
        (None, Some(pie)) => {
            if let Some(kind) = update.chart_type
                && !kind.is_pie()
            {
                bail!("cannot change a pie chart into a categorical chart; delete and recreate it");
            }
            if let Some(legend) = &update.legend_position {
                pie.legend_position = Some(normalize_legend_position(legend));
            }
            if let Some(series) = &update.series {
                let [single] = series.as_slice() else {
                    bail!("pie charts take exactly one series, got {}", series.len());
                };
                pie.series = Some(wire::ChartData::from_range(single.region.to_grid_range()));
            }
            if let Some(domain) = &update.domain {
                pie.domain = Some(wire::ChartData::from_range(domain.to_grid_range()));
            }
        }
        _ => bail!("existing chart has an unsupported spec shape"),
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::GridSpan;

    fn region(sheet_id: i64, start_row: u32, end_row: u32, col: u32) -> GridRegion {
        GridRegion {
            sheet_id,
            span: GridSpan {
                start_row,
                end_row: Some(end_row),
                start_col: col,
                end_col: Some(col),
            },
        }
    }

    #[test]
    fn legend_suffix_normalization() {
        assert_eq!(normalize_legend_position("bottom"), "BOTTOM_LEGEND");
        assert_eq!(normalize_legend_position("RIGHT_LEGEND"), "RIGHT_LEGEND");
        assert_eq!(normalize_legend_position("no"), "NO_LEGEND");
    }

    #[test]
    fn pie_domain_derived_from_series_row_span() {
        let series = region(2, 1, 9, 1); // B2:B10
        let spec = build_pie_spec(None, &series, None, None, None, None);
        let pie = spec.pie_chart.unwrap();
        let domain = pie.domain.unwrap().source_range.unwrap().sources[0].clone();
        assert_eq!(domain.sheet_id, 2);
        assert_eq!(domain.start_row_index, Some(1));
        assert_eq!(domain.end_row_index, Some(10));
        assert_eq!(domain.start_column_index, Some(0));
        assert_eq!(domain.end_column_index, Some(1));
    }

    #[test]
    fn explicit_domain_wins_outright() {
        let series = region(2, 1, 9, 1);
        let explicit = region(2, 0, 9, 3);
        let spec = build_pie_spec(None, &series, Some(&explicit), None, None, None);
        let domain = spec.pie_chart.unwrap().domain.unwrap().source_range.unwrap().sources[0]
            .clone();
        assert_eq!(domain.start_column_index, Some(3));
    }

    #[test]
    fn update_preserves_untouched_fields() {
        let existing = build_basic_spec(
            ChartKind::Column,
            Some("Revenue"),
            &[ResolvedSeries {
                region: region(0, 0, 9, 1),
                target_axis: Some(TargetAxis::Right),
                render_type: None,
            }],
            None,
            Some("bottom"),
            Some(1),
        )
        .unwrap();

        let merged = merge_chart_update(
            &existing,
            &ChartUpdate {
                title: Some("Revenue 2024".to_string()),
                ..ChartUpdate::default()
            },
        )
        .unwrap();

        assert_eq!(merged.title.as_deref(), Some("Revenue 2024"));
        let basic = merged.basic_chart.unwrap();
        assert_eq!(basic.legend_position.as_deref(), Some("BOTTOM_LEGEND"));
        assert_eq!(basic.header_count, Some(1));
        assert_eq!(basic.series[0].target_axis.as_deref(), Some("RIGHT_AXIS"));
    }

    #[test]
    fn pie_update_rejects_multiple_series() {
        let existing = build_pie_spec(None, &region(0, 0, 4, 1), None, None, None, None);
        let err = merge_chart_update(
            &existing,
            &ChartUpdate {
                series: Some(vec![
                    ResolvedSeries {
                        region: region(0, 0, 4, 1),
                        target_axis: None,
                        render_type: None,
                    },
                    ResolvedSeries {
                        region: region(0, 0, 4, 2),
                        target_axis: None,
                        render_type: None,
                    },
                ]),
                ..ChartUpdate::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly one series"));
    }

    #[test]
    fn family_change_is_rejected() {
        let series = region(0, 0, 4, 1);
        let existing = build_pie_spec(None, &series, None, None, None, None);
        let err = merge_chart_update(
            &existing,
            &ChartUpdate {
                chart_type: Some(ChartKind::Line),
                ..ChartUpdate::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("delete and recreate"));
    }
}
