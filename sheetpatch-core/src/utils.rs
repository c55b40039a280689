//! Cell address encoding and decoding.
//!
//! Addresses are `(column, row)` pairs, both 1-indexed. Columns use bijective
//! base-26 letters (`A`..`Z`, `AA`, ...), so there is no zero digit.

use crate::error::{Result, SheetpatchError};

/// Maximum column number in Excel (XFD = 16384).
pub const MAX_COLUMN: u32 = 16384;
/// Maximum row number in Excel.
pub const MAX_ROW: u32 = 1_048_576;

/// Encode a 1-indexed `(column, row)` pair as an address such as `"AA9"`.
pub fn cell_address(column: u32, row: u32) -> Result<String> {
    if row < 1 {
        return Err(SheetpatchError::InvalidAddress(
            "there is no row 0 in a worksheet, rows start at 1".to_string(),
        ));
    }
    if column < 1 {
        return Err(SheetpatchError::InvalidAddress(
            "there is no column 0 in a worksheet, columns start at 1".to_string(),
        ));
    }
    let mut address = column_to_letter(column);
    address.push_str(itoa::Buffer::new().format(row));
    Ok(address)
}

/// Encode `(column, row)` for a cell that can exist on a worksheet: like
/// [`cell_address`], but also rejects positions past column `XFD` or row
/// 1048576, which stored references can never name.
pub fn worksheet_address(column: u32, row: u32) -> Result<String> {
    let address = cell_address(column, row)?;
    if column > MAX_COLUMN {
        return Err(SheetpatchError::InvalidAddress(format!(
            "column {} is past the last worksheet column (XFD = {})",
            column, MAX_COLUMN
        )));
    }
    if row > MAX_ROW {
        return Err(SheetpatchError::InvalidAddress(format!(
            "row {} is past the last worksheet row ({})",
            row, MAX_ROW
        )));
    }
    Ok(address)
}

/// Decode an address such as `"AA9"` into `(column, row)`.
pub fn parse_address(address: &str) -> Result<(u32, u32)> {
    let address = address.trim();
    parse_address_bytes(address.as_bytes())
        .ok_or_else(|| SheetpatchError::InvalidAddress(format!("'{}' is not a cell reference", address)))
}

/// Decode an address from bytes into `(column, row)` without allocating.
#[inline]
pub fn parse_address_bytes(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut i = 0usize;
    let mut column: u32 = 0;

    while i < bytes.len() {
        let upper = match bytes[i] {
            b @ b'a'..=b'z' => b - 32,
            b @ b'A'..=b'Z' => b,
            _ => break,
        };
        column = column.checked_mul(26)?.checked_add((upper - b'A' + 1) as u32)?;
        if column > MAX_COLUMN {
            return None;
        }
        i += 1;
    }

    if i == 0 || i >= bytes.len() {
        return None;
    }

    let row = parse_u32_bytes(&bytes[i..])?;
    if row == 0 || row > MAX_ROW {
        return None;
    }

    Some((column, row))
}

/// Parse a u32 directly from bytes without string allocation.
#[inline]
pub fn parse_u32_bytes(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add((b - b'0') as u32)?;
    }
    Some(result)
}

/// Convert column letters (e.g., "A", "AB", "XFD") to a 1-indexed column number.
pub fn letter_to_column(letters: &str) -> Result<u32> {
    let mut result: u32 = 0;

    for &b in letters.as_bytes() {
        let upper = match b {
            b'a'..=b'z' => b - 32,
            b'A'..=b'Z' => b,
            _ => {
                return Err(SheetpatchError::InvalidAddress(format!(
                    "invalid character in column: {}",
                    b as char
                )))
            }
        };
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add((upper - b'A' + 1) as u32))
            .filter(|r| *r <= MAX_COLUMN)
            .ok_or_else(|| {
                SheetpatchError::InvalidAddress(format!(
                    "column '{}' exceeds maximum (XFD = {})",
                    letters, MAX_COLUMN
                ))
            })?;
    }

    if result == 0 {
        return Err(SheetpatchError::InvalidAddress("empty column letters".to_string()));
    }

    Ok(result)
}

/// Convert a 1-indexed column number to letters (e.g., 1 -> "A", 28 -> "AB").
pub fn column_to_letter(column: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut col = column;

    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }

    letters.iter().rev().map(|&b| b as char).collect()
}

/// Trailing decimal digits of a part's file stem: `xl/worksheets/sheet12.xml` -> 12.
pub fn part_number(part_path: &str) -> Option<u32> {
    let file_name = part_path.rsplit('/').next()?;
    let stem = file_name.split('.').next()?;
    let digits_at = stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    parse_u32_bytes(stem[digits_at..].as_bytes())
}
