use schemars::JsonSchema;
use serde::de;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum MergeType {
    #[default]
    MergeAll,
    MergeRows,
    MergeColumns,
}

impl MergeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MergeAll => "merge_all",
            Self::MergeRows => "merge_rows",
            Self::MergeColumns => "merge_columns",
        }
    }

    pub fn to_wire(self) -> &'static str {
        match self {
            Self::MergeAll => "MERGE_ALL",
            Self::MergeRows => "MERGE_ROWS",
            Self::MergeColumns => "MERGE_COLUMNS",
        }
    }
}

impl fmt::Display for MergeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MergeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "merge_all" | "all" => Ok(Self::MergeAll),
            "merge_rows" | "rows" => Ok(Self::MergeRows),
            "merge_columns" | "columns" => Ok(Self::MergeColumns),
            other => Err(de::Error::unknown_variant(
                other,
                &["merge_all", "merge_rows", "merge_columns"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InsertPosition {
    Before,
    #[default]
    After,
}

impl InsertPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl<'de> Deserialize<'de> for InsertPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "before" | "above" => Ok(Self::Before),
            "after" | "below" => Ok(Self::After),
            other => Err(de::Error::unknown_variant(other, &["before", "after"])),
        }
    }
}

impl From<InsertPosition> for crate::addressing::InsertAt {
    fn from(value: InsertPosition) -> Self {
        match value {
            InsertPosition::Before => Self::Before,
            InsertPosition::After => Self::After,
        }
    }
}

/// Chart families and the categorical render types within the basic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Column,
    Line,
    Area,
    SteppedArea,
    Scatter,
    Combo,
    Pie,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Column => "column",
            Self::Line => "line",
            Self::Area => "area",
            Self::SteppedArea => "stepped_area",
            Self::Scatter => "scatter",
            Self::Combo => "combo",
            Self::Pie => "pie",
        }
    }

    pub fn is_pie(self) -> bool {
        matches!(self, Self::Pie)
    }

    /// Wire token within the basic-chart family. The pie family has its own
    /// spec object and never reaches this.
    pub fn to_wire(self) -> &'static str {
        match self {
            Self::Bar => "BAR",
            Self::Column => "COLUMN",
            Self::Line => "LINE",
            Self::Area => "AREA",
            Self::SteppedArea => "STEPPED_AREA",
            Self::Scatter => "SCATTER",
            Self::Combo => "COMBO",
            Self::Pie => "PIE",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "column" => Ok(Self::Column),
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "stepped_area" | "steppedarea" => Ok(Self::SteppedArea),
            "scatter" => Ok(Self::Scatter),
            "combo" => Ok(Self::Combo),
            "pie" => Ok(Self::Pie),
            other => Err(de::Error::unknown_variant(
                other,
                &[
                    "bar",
                    "column",
                    "line",
                    "area",
                    "stepped_area",
                    "scatter",
                    "combo",
                    "pie",
                ],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TargetAxis {
    #[default]
    Left,
    Right,
}

impl TargetAxis {
    pub fn to_wire(self) -> &'static str {
        match self {
            Self::Left => "LEFT_AXIS",
            Self::Right => "RIGHT_AXIS",
        }
    }
}

impl<'de> Deserialize<'de> for TargetAxis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "left" | "left_axis" => Ok(Self::Left),
            "right" | "right_axis" => Ok(Self::Right),
            other => Err(de::Error::unknown_variant(other, &["left", "right"])),
        }
    }
}
