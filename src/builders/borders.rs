//! Border update requests.
//!
//! Each of the six edges is independently optional, and the distinction
//! matters: an edge set to style `NONE` actively removes an existing border,
//! while an omitted edge is left untouched.

use crate::backend::wire;
use crate::builders::style::parse_color;
use crate::resolve::GridRegion;
use anyhow::{Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const BORDER_STYLES: &[&str] = &[
    "NONE",
    "DOTTED",
    "DASHED",
    "SOLID",
    "SOLID_MEDIUM",
    "SOLID_THICK",
    "DOUBLE",
];

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BorderEdgeSpec {
    /// none | dotted | dashed | solid | solid_medium | solid_thick | double
    pub style: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BordersSpec {
    #[serde(default)]
    pub top: Option<BorderEdgeSpec>,
    #[serde(default)]
    pub bottom: Option<BorderEdgeSpec>,
    #[serde(default)]
    pub left: Option<BorderEdgeSpec>,
    #[serde(default)]
    pub right: Option<BorderEdgeSpec>,
    #[serde(default)]
    pub inner_horizontal: Option<BorderEdgeSpec>,
    #[serde(default)]
    pub inner_vertical: Option<BorderEdgeSpec>,
}

impl BordersSpec {
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
            && self.bottom.is_none()
            && self.left.is_none()
            && self.right.is_none()
            && self.inner_horizontal.is_none()
            && self.inner_vertical.is_none()
    }
}

fn edge_to_wire(edge: &BorderEdgeSpec) -> Result<wire::Border> {
    let style = edge.style.trim().to_ascii_uppercase();
    if !BORDER_STYLES.contains(&style.as_str()) {
        bail!(
            "invalid border style '{}' (expected one of: {})",
            edge.style,
            BORDER_STYLES.join(", ")
        );
    }
    let color = edge.color.as_deref().map(parse_color).transpose()?;
    Ok(wire::Border { style, color })
}

pub fn build_update_borders(region: &GridRegion, spec: &BordersSpec) -> Result<wire::Request> {
    if spec.is_empty() {
        bail!("no border edges provided");
    }

    let convert = |edge: &Option<BorderEdgeSpec>| -> Result<Option<wire::Border>> {
        edge.as_ref().map(edge_to_wire).transpose()
    };

    Ok(wire::Request::UpdateBorders(wire::UpdateBordersRequest {
        range: region.to_grid_range(),
        top: convert(&spec.top)?,
        bottom: convert(&spec.bottom)?,
        left: convert(&spec.left)?,
        right: convert(&spec.right)?,
        inner_horizontal: convert(&spec.inner_horizontal)?,
        inner_vertical: convert(&spec.inner_vertical)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::GridSpan;
    use serde_json::json;

    fn region() -> GridRegion {
        GridRegion {
            sheet_id: 3,
            span: GridSpan::cell(1, 1),
        }
    }

    #[test]
    fn explicit_none_is_sent_and_omitted_edges_are_absent() {
        let spec = BordersSpec {
            top: Some(BorderEdgeSpec {
                style: "NONE".to_string(),
                color: None,
            }),
            ..BordersSpec::default()
        };
        let request = build_update_borders(&region(), &spec).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["updateBorders"]["top"], json!({"style": "NONE"}));
        assert!(value["updateBorders"].get("bottom").is_none());
        assert!(value["updateBorders"].get("innerHorizontal").is_none());
    }

    #[test]
    fn unknown_style_is_rejected() {
        let spec = BordersSpec {
            left: Some(BorderEdgeSpec {
                style: "wavy".to_string(),
                color: None,
            }),
            ..BordersSpec::default()
        };
        let err = build_update_borders(&region(), &spec).unwrap_err();
        assert!(err.to_string().contains("invalid border style"));
    }
}
