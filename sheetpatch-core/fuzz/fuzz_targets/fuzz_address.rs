#![no_main]

//! Fuzz target for the cell address codec.
//!
//! Every parser must reject bad input with an error instead of panicking,
//! and every address it accepts must encode back to the same coordinates.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sheetpatch_core::utils::{parse_address_bytes, parse_u32_bytes, MAX_COLUMN, MAX_ROW};
use sheetpatch_core::{cell_address, column_to_letter, letter_to_column, parse_address};

#[derive(Arbitrary, Debug)]
struct AddressInput {
    raw_bytes: Vec<u8>,
    text: String,
    column: u32,
    row: u32,
}

fn check_parse(text: &str) {
    let parsed = parse_address(text);
    let raw = parse_address_bytes(text.trim().as_bytes());
    assert_eq!(parsed.as_ref().ok().copied(), raw, "string and byte parsers disagree on {:?}", text);

    if let Ok((column, row)) = parsed {
        assert!((1..=MAX_COLUMN).contains(&column));
        assert!((1..=MAX_ROW).contains(&row));
        let encoded = cell_address(column, row).unwrap();
        assert_eq!(parse_address(&encoded).unwrap(), (column, row));
    }
}

fn check_bytes(bytes: &[u8]) {
    if let Some((column, row)) = parse_address_bytes(bytes) {
        assert!(column >= 1 && row >= 1);
    }
    let _ = parse_u32_bytes(bytes);
}

fn check_encode(column: u32, row: u32) {
    match cell_address(column, row) {
        Ok(address) => {
            assert!(column >= 1 && row >= 1);
            if column <= MAX_COLUMN && row <= MAX_ROW {
                assert_eq!(parse_address(&address).unwrap(), (column, row));
            }
        }
        Err(_) => assert!(column == 0 || row == 0),
    }
}

fn check_letters(text: &str, column: u32) {
    if let Ok(col) = letter_to_column(text) {
        assert!((1..=MAX_COLUMN).contains(&col));
        assert_eq!(letter_to_column(&column_to_letter(col)).unwrap(), col);
    }

    let letters = column_to_letter(column);
    if column == 0 {
        assert!(letters.is_empty());
    } else if column <= MAX_COLUMN {
        assert_eq!(letter_to_column(&letters).unwrap(), column);
    }
}

fuzz_target!(|input: AddressInput| {
    check_parse(&input.text);
    check_bytes(&input.raw_bytes);
    check_encode(input.column, input.row);
    check_letters(&input.text, input.column);
});
