use sheetwire_mcp::addressing::{GridSpan, column_index, column_letters, parse_reference};

#[test]
fn qualified_rectangle_parses_to_zero_based_inclusive_span() {
    let parsed = parse_reference("Sheet1!A1:C10").unwrap();
    assert_eq!(parsed.sheet_name.as_deref(), Some("Sheet1"));
    assert_eq!(
        parsed.span,
        GridSpan {
            start_row: 0,
            end_row: Some(9),
            start_col: 0,
            end_col: Some(2),
        }
    );
}

#[test]
fn quoted_sheet_single_cell() {
    let parsed = parse_reference("'My Sheet'!B2").unwrap();
    assert_eq!(parsed.sheet_name.as_deref(), Some("My Sheet"));
    assert_eq!(parsed.span, GridSpan::cell(1, 1));
}

#[test]
fn doubled_quote_unescapes_in_sheet_name() {
    let parsed = parse_reference("'Bob''s Sheet'!A1").unwrap();
    assert_eq!(parsed.sheet_name.as_deref(), Some("Bob's Sheet"));
}

#[test]
fn open_ended_rows_stay_unbounded() {
    let parsed = parse_reference("A2:B").unwrap();
    assert_eq!(parsed.span.start_row, 1);
    assert_eq!(parsed.span.end_row, None);
    assert_eq!(parsed.span.end_col, Some(1));

    let parsed = parse_reference("A:C").unwrap();
    assert_eq!(parsed.span.start_row, 0);
    assert_eq!(parsed.span.end_row, None);
    assert_eq!(parsed.span.end_col, Some(2));
}

#[test]
fn absolute_markers_are_ignored() {
    let parsed = parse_reference("$A$1:$C$10").unwrap();
    assert_eq!(parsed.span.end_row, Some(9));
    assert_eq!(parsed.span.end_col, Some(2));
}

#[test]
fn reversed_bounds_normalize() {
    let parsed = parse_reference("C10:A1").unwrap();
    assert_eq!(parsed.span.start_row, 0);
    assert_eq!(parsed.span.end_row, Some(9));
    assert_eq!(parsed.span.start_col, 0);
    assert_eq!(parsed.span.end_col, Some(2));
}

#[test]
fn malformed_references_are_rejected() {
    for bad in ["", "A", "1:5", "Sheet1!", "A0", "'Open!A1"] {
        assert!(parse_reference(bad).is_err(), "expected '{bad}' to fail");
    }
}

#[test]
fn span_renders_back_to_a1_with_quoting() {
    let span = GridSpan {
        start_row: 1,
        end_row: Some(9),
        start_col: 1,
        end_col: Some(3),
    };
    assert_eq!(span.to_a1(None), "B2:D10");
    assert_eq!(span.to_a1(Some("Data")), "Data!B2:D10");
    assert_eq!(span.to_a1(Some("My Sheet")), "'My Sheet'!B2:D10");
}

#[test]
fn open_ended_span_keeps_its_start_row() {
    let span = GridSpan {
        start_row: 1,
        end_row: None,
        start_col: 0,
        end_col: Some(1),
    };
    assert_eq!(span.to_a1(None), "A2:B");
    let parsed = parse_reference(&span.to_a1(None)).unwrap();
    assert_eq!(parsed.span, span);

    let from_top = GridSpan { start_row: 0, ..span };
    assert_eq!(from_top.to_a1(None), "A:B");
}

#[test]
fn column_letters_cover_multi_letter_columns() {
    assert_eq!(column_letters(0), "A");
    assert_eq!(column_letters(25), "Z");
    assert_eq!(column_letters(26), "AA");
    assert_eq!(column_letters(701), "ZZ");
    assert_eq!(column_letters(702), "AAA");
}

#[test]
fn every_column_through_zzz_round_trips() {
    // 26 + 26^2 + 26^3 = 18278 covers every letter string up to "ZZZ".
    for index in 0..18_278u32 {
        let letters = column_letters(index);
        assert!(letters.len() <= 3, "{index} -> {letters}");
        assert_eq!(
            column_index(&letters).unwrap(),
            index,
            "{letters} did not round-trip"
        );
        assert_eq!(column_letters(column_index(&letters).unwrap()), letters);
    }
}
