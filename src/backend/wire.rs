//! Serde models of the backend service's request and response shapes.
//!
//! Every optional field carries `skip_serializing_if`: an omitted field means
//! "leave the existing value untouched" on the backend, so serializing nulls
//! or defaults would silently overwrite state the caller never mentioned.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Half-open grid rectangle in the backend's native addressing. Absent
/// bounds mean "to the end of the sheet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridRange {
    pub sheet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Color {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Padding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format: Option<TextFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_entered_format: Option<CellFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepeatCellRequest {
    pub range: GridRange,
    pub cell: CellData,
    /// Dot-path field mask listing exactly the attributes being mutated.
    pub fields: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Border {
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBordersRequest {
    pub range: GridRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_horizontal: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_vertical: Option<Border>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeCellsRequest {
    pub range: GridRange,
    pub merge_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnmergeCellsRequest {
    pub range: GridRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: String,
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsertDimensionRequest {
    pub range: DimensionRange,
    pub inherit_from_before: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSourceRange {
    pub sources: Vec<GridRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<ChartSourceRange>,
}

impl ChartData {
    pub fn from_range(range: GridRange) -> Self {
        Self {
            source_range: Some(ChartSourceRange {
                sources: vec![range],
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicChartDomain {
    pub domain: ChartData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicChartSeries {
    pub series: ChartData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_axis: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub render_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicChartSpec {
    pub chart_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_position: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<BasicChartDomain>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<BasicChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PieChartSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pie_hole: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_dimensional: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_chart: Option<BasicChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pie_chart: Option<PieChartSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridCoordinate {
    pub sheet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_index: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayPosition {
    pub anchor_cell: GridCoordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x_pixels: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y_pixels: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_pixels: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_pixels: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddedObjectPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_position: Option<OverlayPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_sheet: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddedChart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_id: Option<i64>,
    pub spec: ChartSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<EmbeddedObjectPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddChartRequest {
    pub chart: EmbeddedChart,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateChartSpecRequest {
    pub chart_id: i64,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteEmbeddedObjectRequest {
    pub object_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddSheetRequest {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteSheetRequest {
    pub sheet_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuplicateSheetRequest {
    pub source_sheet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_sheet_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_sheet_name: Option<String>,
}

/// One entry in a structural batch update. Externally tagged so each variant
/// serializes as the backend's `{"repeatCell": {...}}` union member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    RepeatCell(RepeatCellRequest),
    UpdateBorders(UpdateBordersRequest),
    MergeCells(MergeCellsRequest),
    UnmergeCells(UnmergeCellsRequest),
    InsertDimension(InsertDimensionRequest),
    AddChart(AddChartRequest),
    UpdateChartSpec(UpdateChartSpecRequest),
    DeleteEmbeddedObject(DeleteEmbeddedObjectRequest),
    AddSheet(AddSheetRequest),
    DeleteSheet(DeleteSheetRequest),
    DuplicateSheet(DuplicateSheetRequest),
}

/// Per-request reply inside a batch update response. Most structural
/// requests reply with an empty object; the ones that allocate ids echo the
/// created object back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_chart: Option<AddChartReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_sheet: Option<AddSheetReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddChartReply {
    pub chart: EmbeddedChart,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchUpdateReply {
    pub spreadsheet_id: String,
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateValuesReply {
    pub spreadsheet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_columns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchUpdateValuesReply {
    pub spreadsheet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_updated_cells: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<UpdateValuesReply>,
}
