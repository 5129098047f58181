//! Cell formatting requests with partial-update semantics.
//!
//! Only attributes the caller explicitly set appear in the produced format
//! object and its field mask; an omitted attribute leaves the backend's
//! existing formatting untouched, which is not the same as resetting it.

use crate::backend::wire;
use crate::resolve::GridRegion;
use anyhow::{Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StyleSpec {
    /// Hex color, `RRGGBB` or `#RRGGBB` (or `AARRGGBB` with alpha first).
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub font_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<i64>,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub strikethrough: Option<bool>,
    #[serde(default)]
    pub underline: Option<bool>,
    /// left | center | right (case-insensitive).
    #[serde(default)]
    pub horizontal_alignment: Option<String>,
    /// top | middle | bottom (case-insensitive).
    #[serde(default)]
    pub vertical_alignment: Option<String>,
    /// overflow | clip | wrap (case-insensitive).
    #[serde(default)]
    pub wrap_strategy: Option<String>,
    #[serde(default)]
    pub number_format: Option<NumberFormatSpec>,
    #[serde(default)]
    pub padding: Option<PaddingSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NumberFormatSpec {
    /// NUMBER | CURRENCY | PERCENT | DATE | TIME | DATE_TIME | SCIENTIFIC | TEXT
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PaddingSpec {
    #[serde(default)]
    pub top: Option<i64>,
    #[serde(default)]
    pub bottom: Option<i64>,
    #[serde(default)]
    pub left: Option<i64>,
    #[serde(default)]
    pub right: Option<i64>,
}

/// Parse a hex color into the backend's float channels.
pub fn parse_color(input: &str) -> Result<wire::Color> {
    let hex = input.trim_start_matches('#');
    let (alpha, rgb) = match hex.len() {
        6 => (None, hex),
        8 => (Some(&hex[0..2]), &hex[2..]),
        _ => bail!("invalid color '{input}' (expected RRGGBB or AARRGGBB)"),
    };

    let channel = |s: &str| -> Result<f64> {
        let byte = u8::from_str_radix(s, 16)
            .map_err(|_| anyhow::anyhow!("invalid color '{input}' (non-hex digit)"))?;
        Ok(byte as f64 / 255.0)
    };

    Ok(wire::Color {
        red: Some(channel(&rgb[0..2])?),
        green: Some(channel(&rgb[2..4])?),
        blue: Some(channel(&rgb[4..6])?),
        alpha: alpha.map(channel).transpose()?,
    })
}

fn alignment_token(input: &str, allowed: &[&str], what: &str) -> Result<String> {
    let token = input.trim().to_ascii_uppercase();
    if !allowed.contains(&token.as_str()) {
        bail!(
            "invalid {what} '{input}' (expected one of: {})",
            allowed.join(", ")
        );
    }
    Ok(token)
}

const MASK_PREFIX: &str = "userEnteredFormat";

/// Translate a style into a repeat-cell request over the region. The
/// returned field mask names exactly the attributes the caller set.
pub fn build_repeat_cell(region: &GridRegion, style: &StyleSpec) -> Result<wire::Request> {
    let mut format = wire::CellFormat::default();
    let mut text = wire::TextFormat::default();
    let mut mask: Vec<String> = Vec::new();
    let push = |path: &str, mask: &mut Vec<String>| {
        mask.push(format!("{MASK_PREFIX}.{path}"));
    };

    if let Some(color) = &style.background_color {
        format.background_color = Some(parse_color(color)?);
        push("backgroundColor", &mut mask);
    }
    if let Some(color) = &style.font_color {
        text.foreground_color = Some(parse_color(color)?);
        push("textFormat.foregroundColor", &mut mask);
    }
    if let Some(family) = &style.font_family {
        text.font_family = Some(family.clone());
        push("textFormat.fontFamily", &mut mask);
    }
    if let Some(size) = style.font_size {
        if size <= 0 {
            bail!("invalid font_size {size} (must be positive)");
        }
        text.font_size = Some(size);
        push("textFormat.fontSize", &mut mask);
    }
    if let Some(bold) = style.bold {
        text.bold = Some(bold);
        push("textFormat.bold", &mut mask);
    }
    if let Some(italic) = style.italic {
        text.italic = Some(italic);
        push("textFormat.italic", &mut mask);
    }
    if let Some(strikethrough) = style.strikethrough {
        text.strikethrough = Some(strikethrough);
        push("textFormat.strikethrough", &mut mask);
    }
    if let Some(underline) = style.underline {
        text.underline = Some(underline);
        push("textFormat.underline", &mut mask);
    }
    if let Some(alignment) = &style.horizontal_alignment {
        format.horizontal_alignment = Some(alignment_token(
            alignment,
            &["LEFT", "CENTER", "RIGHT"],
            "horizontal_alignment",
        )?);
        push("horizontalAlignment", &mut mask);
    }
    if let Some(alignment) = &style.vertical_alignment {
        format.vertical_alignment = Some(alignment_token(
            alignment,
            &["TOP", "MIDDLE", "BOTTOM"],
            "vertical_alignment",
        )?);
        push("verticalAlignment", &mut mask);
    }
    if let Some(wrap) = &style.wrap_strategy {
        format.wrap_strategy = Some(alignment_token(
            wrap,
            &["OVERFLOW_CELL", "OVERFLOW", "CLIP", "WRAP", "LEGACY_WRAP"],
            "wrap_strategy",
        )
        .map(|token| {
            // Callers commonly write the short form.
            if token == "OVERFLOW" {
                "OVERFLOW_CELL".to_string()
            } else {
                token
            }
        })?);
        push("wrapStrategy", &mut mask);
    }
    if let Some(number_format) = &style.number_format {
        format.number_format = Some(wire::NumberFormat {
            kind: number_format.kind.trim().to_ascii_uppercase(),
            pattern: number_format.pattern.clone(),
        });
        push("numberFormat", &mut mask);
    }
    if let Some(padding) = &style.padding {
        format.padding = Some(wire::Padding {
            top: padding.top,
            bottom: padding.bottom,
            left: padding.left,
            right: padding.right,
        });
        push("padding", &mut mask);
    }

    if text != wire::TextFormat::default() {
        format.text_format = Some(text);
    }

    if mask.is_empty() {
        bail!("no formatting attributes provided");
    }

    Ok(wire::Request::RepeatCell(wire::RepeatCellRequest {
        range: region.to_grid_range(),
        cell: wire::CellData {
            user_entered_format: Some(format),
        },
        fields: mask.join(","),
    }))
}
