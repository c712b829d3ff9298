use mdn_converter::common::errors::MdnError;
use mdn_converter::sheet::cell_ref::{
    index_to_letter, letter_to_index, parse_cell_ref, parse_range_ref, CellRef, MAX_RANGE_CELLS,
};

#[test]
fn letter_index_boundaries() {
    for (index, letters) in [(1, "A"), (26, "Z"), (27, "AA"), (702, "ZZ"), (703, "AAA")] {
        assert_eq!(index_to_letter(index).expect("letters"), letters);
        assert_eq!(letter_to_index(letters).expect("index"), index);
    }
}

#[test]
fn letters_and_indexes_are_inverse() {
    for n in 1..=2000u32 {
        let letters = index_to_letter(n).expect("letters");
        assert_eq!(letter_to_index(&letters).expect("index"), n);
    }
}

#[test]
fn index_zero_is_rejected() {
    let err = index_to_letter(0).expect_err("zero has no letters");
    assert!(matches!(err, MdnError::InvalidArgument(_)));
}

#[test]
fn lowercase_letters_are_rejected() {
    let err = letter_to_index("ab").expect_err("lowercase");
    assert!(matches!(err, MdnError::InvalidArgument(_)));
}

#[test]
fn parse_cell_ref_splits_letters_and_row() {
    let cell = parse_cell_ref("AA10").expect("valid reference");
    assert_eq!(cell.letters, "AA");
    assert_eq!(cell.col, 27);
    assert_eq!(cell.row, 10);
    assert_eq!(cell.zero_based(), (9, 26));
    assert_eq!(cell.to_string(), "AA10");
}

#[test]
fn parse_cell_ref_rejects_bad_syntax() {
    for bad in ["10A", "a1", "A", "12", "A0", "A1:B2", " A1", ""] {
        let err = parse_cell_ref(bad).expect_err(bad);
        assert!(matches!(err, MdnError::InvalidReference(_)), "{bad}");
    }
}

#[test]
fn cell_ref_from_zero_based_and_display() {
    let cell = CellRef::from_zero_based(4, 2).expect("cell");
    assert_eq!(cell.to_string(), "C5");
    assert_eq!(parse_cell_ref("C5").expect("parse"), cell);
}

#[test]
fn range_is_column_major() {
    let cells = parse_range_ref("A1:B2", 1000).expect("range");
    let names: Vec<String> = cells.iter().map(CellRef::to_string).collect();
    assert_eq!(names, ["A1", "A2", "B1", "B2"]);
}

#[test]
fn reversed_range_is_normalized() {
    let forward = parse_range_ref("A1:B2", 1000).expect("forward");
    let reversed = parse_range_ref("B2:A1", 1000).expect("reversed");
    assert_eq!(forward, reversed);
}

#[test]
fn union_keeps_part_order() {
    let cells = parse_range_ref("C3, A1:A2", 1000).expect("union");
    let names: Vec<String> = cells.iter().map(CellRef::to_string).collect();
    assert_eq!(names, ["C3", "A1", "A2"]);
}

#[test]
fn bare_columns_use_row_bound() {
    let cells = parse_range_ref("B:C", 3).expect("columns");
    let names: Vec<String> = cells.iter().map(CellRef::to_string).collect();
    assert_eq!(names, ["B1", "B2", "B3", "C1", "C2", "C3"]);
}

#[test]
fn malformed_ranges_are_rejected() {
    for bad in ["A1:", "A1,,B2", "1:2", "A1:b2"] {
        assert!(parse_range_ref(bad, 10).is_err(), "{bad}");
    }
}

#[test]
fn references_past_the_sheet_limits_are_rejected() {
    assert_eq!(parse_cell_ref("XFD1048576").expect("last cell").col, 16_384);
    for bad in ["XFE1", "A1048577", "A4000000000", "ZZZZZZZZ1"] {
        let err = parse_cell_ref(bad).expect_err(bad);
        assert!(matches!(err, MdnError::InvalidReference(_)), "{bad}");
    }
    assert!(CellRef::from_zero_based(1_048_576, 0).is_err());
    assert!(CellRef::from_zero_based(0, 16_384).is_err());
}

#[test]
fn oversized_ranges_are_rejected_before_expansion() {
    let err = parse_range_ref("A1:XFD1048576", 1000).expect_err("whole sheet");
    assert!(err.to_string().contains(&MAX_RANGE_CELLS.to_string()));
    assert!(parse_range_ref("A:Z", 1_048_576).is_err());
    assert!(parse_range_ref("A1:A262144", 1000).is_ok());
    assert!(parse_range_ref("A1:A262144,B1", 1000).is_err());
    assert!(parse_range_ref("A:XFE", 1).is_err());
}
