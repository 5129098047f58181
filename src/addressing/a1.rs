use crate::errors::TranslationError;

/// Zero-based rectangular region with inclusive bounds. `None` on an end
/// bound means "to the end of the sheet" and must survive translation; the
/// request builders decide how (and whether) to close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpan {
    pub start_row: u32,
    pub end_row: Option<u32>,
    pub start_col: u32,
    pub end_col: Option<u32>,
}

impl GridSpan {
    pub fn cell(row: u32, col: u32) -> Self {
        Self {
            start_row: row,
            end_row: Some(row),
            start_col: col,
            end_col: Some(col),
        }
    }

    /// Height in rows, when both row bounds are finite.
    pub fn height(&self) -> Option<u32> {
        self.end_row.map(|end| end - self.start_row + 1)
    }

    pub fn width(&self) -> Option<u32> {
        self.end_col.map(|end| end - self.start_col + 1)
    }

    /// Render back to A1, optionally qualified with a sheet title. Open-ended
    /// rows keep a nonzero start row (`A2:B`); from row 0 they render as a
    /// bare column reference (`A:B`).
    pub fn to_a1(&self, sheet: Option<&str>) -> String {
        let body = match (self.end_row, self.end_col) {
            (Some(end_row), Some(end_col)) => {
                let start = format!("{}{}", column_letters(self.start_col), self.start_row + 1);
                let end = format!("{}{}", column_letters(end_col), end_row + 1);
                if start == end {
                    start
                } else {
                    format!("{start}:{end}")
                }
            }
            _ => {
                let end_col = self.end_col.unwrap_or(self.start_col);
                let start = if self.start_row > 0 {
                    format!("{}{}", column_letters(self.start_col), self.start_row + 1)
                } else {
                    column_letters(self.start_col)
                };
                format!("{start}:{}", column_letters(end_col))
            }
        };

        match sheet {
            Some(title) => format!("{}!{}", quote_sheet_title(title), body),
            None => body,
        }
    }
}

/// Outcome of parsing one A1 reference: the optional sheet qualifier (quotes
/// stripped) and the zero-based span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub sheet_name: Option<String>,
    pub span: GridSpan,
}

/// Parse `['Sheet Name'!]A1[:C10]`. Absolute markers (`$`) are accepted and
/// ignored. A reference with letters on both sides and no digits (`A:A`)
/// yields unbounded row bounds.
pub fn parse_reference(reference: &str) -> Result<ParsedReference, TranslationError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(TranslationError::invalid_range(reference, "empty reference"));
    }

    let (sheet_name, cell_part) = split_sheet_qualifier(reference, trimmed)?;
    if cell_part.is_empty() {
        return Err(TranslationError::invalid_range(
            reference,
            "missing cell reference after sheet name",
        ));
    }

    let mut sides = cell_part.splitn(2, ':');
    let first = parse_side(reference, sides.next().unwrap_or_default())?;
    let second = match sides.next() {
        Some(side) => Some(parse_side(reference, side)?),
        None => None,
    };

    let span = match second {
        None => {
            // Single cell: a bare column ("A") is not addressable.
            let row = first.row.ok_or_else(|| {
                TranslationError::invalid_range(reference, "missing row number")
            })?;
            GridSpan::cell(row, first.col)
        }
        Some(second) => {
            let start_col = first.col.min(second.col);
            let end_col = first.col.max(second.col);
            let (start_row, end_row) = match (first.row, second.row) {
                (Some(a), Some(b)) => (a.min(b), Some(a.max(b))),
                (Some(a), None) => (a, None),
                (None, Some(b)) => (0, Some(b)),
                (None, None) => (0, None),
            };
            GridSpan {
                start_row,
                end_row,
                start_col,
                end_col: Some(end_col),
            }
        }
    };

    Ok(ParsedReference { sheet_name, span })
}

struct SideRef {
    col: u32,
    row: Option<u32>,
}

fn parse_side(reference: &str, side: &str) -> Result<SideRef, TranslationError> {
    let side: String = side.chars().filter(|c| *c != '$').collect();
    if side.is_empty() {
        return Err(TranslationError::invalid_range(
            reference,
            "empty range side",
        ));
    }

    let letter_end = side
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(side.len());
    let (letters, digits) = side.split_at(letter_end);

    if letters.is_empty() {
        return Err(TranslationError::invalid_range(
            reference,
            "missing column letters",
        ));
    }

    let col = column_index(letters)
        .map_err(|reason| TranslationError::invalid_range(reference, reason))?;

    let row = if digits.is_empty() {
        None
    } else {
        let number: u32 = digits.parse().map_err(|_| {
            TranslationError::invalid_range(reference, format!("invalid row '{digits}'"))
        })?;
        if number == 0 {
            return Err(TranslationError::invalid_range(reference, "row 0 does not exist"));
        }
        Some(number - 1)
    };

    Ok(SideRef { col, row })
}

/// Split off an optional `Sheet!` prefix, stripping one layer of single
/// quotes (with `''` unescaping) when present.
fn split_sheet_qualifier<'a>(
    reference: &str,
    trimmed: &'a str,
) -> Result<(Option<String>, &'a str), TranslationError> {
    if let Some(rest) = trimmed.strip_prefix('\'') {
        // Quoted titles may themselves contain '!' or escaped quotes, so scan
        // for the closing quote instead of splitting on '!'.
        let mut title = String::new();
        let mut chars = rest.char_indices().peekable();
        while let Some((idx, c)) = chars.next() {
            if c != '\'' {
                title.push(c);
                continue;
            }
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                title.push('\'');
                continue;
            }
            let after = &rest[idx + 1..];
            let cell_part = after.strip_prefix('!').ok_or_else(|| {
                TranslationError::invalid_range(reference, "expected '!' after quoted sheet name")
            })?;
            return Ok((Some(title), cell_part));
        }
        Err(TranslationError::invalid_range(reference, "unmatched quote"))
    } else if let Some((sheet, cell_part)) = trimmed.rsplit_once('!') {
        if sheet.is_empty() {
            return Err(TranslationError::invalid_range(reference, "empty sheet name"));
        }
        Ok((Some(sheet.to_string()), cell_part))
    } else {
        Ok((None, trimmed))
    }
}

/// Column letters → zero-based index, bijective base-26 (A=0, Z=25, AA=26).
pub fn column_index(letters: &str) -> Result<u32, String> {
    if letters.is_empty() {
        return Err("empty column letters".to_string());
    }
    let mut acc: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(format!("invalid column letter '{c}'"));
        }
        acc = acc * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if acc > u32::MAX as u64 {
            return Err(format!("column '{letters}' out of range"));
        }
    }
    Ok((acc - 1) as u32)
}

/// Zero-based index → column letters, the inverse of [`column_index`].
pub fn column_letters(index: u32) -> String {
    let mut n = index as i64;
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        n = n / 26 - 1;
        if n < 0 {
            break;
        }
    }
    letters.into_iter().rev().collect()
}

fn quote_sheet_title(title: &str) -> String {
    let needs_quotes = title.is_empty()
        || title.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_')
        || title.chars().next().is_some_and(|c| c.is_ascii_digit());
    if needs_quotes {
        format!("'{}'", title.replace('\'', "''"))
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_column_math() {
        assert_eq!(column_index("A").unwrap(), 0);
        assert_eq!(column_index("Z").unwrap(), 25);
        assert_eq!(column_index("AA").unwrap(), 26);
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn quoted_sheet_with_bang() {
        let parsed = parse_reference("'P&L!2024'!B2:B4").unwrap();
        assert_eq!(parsed.sheet_name.as_deref(), Some("P&L!2024"));
        assert_eq!(parsed.span.start_col, 1);
    }

    #[test]
    fn absolute_markers_ignored() {
        let parsed = parse_reference("$A$1:$C$10").unwrap();
        assert_eq!(parsed.span, GridSpan {
            start_row: 0,
            end_row: Some(9),
            start_col: 0,
            end_col: Some(2),
        });
    }
}
