//! A1-style cell reference helpers. Rows and columns are 1-based.

/// Largest column index in the XLSX grid (XFD).
pub const MAX_COLUMN: u32 = 16_384;

/// Largest row index in the XLSX grid.
pub const MAX_ROW: u32 = 1_048_576;

/// Parse a cell reference like "B7" into `(column, row)`.
///
/// `$` anchors are ignored. Letters must precede digits and both
/// coordinates must fall inside the sheet grid.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col.checked_mul(26)?.checked_add(digit)?;
        } else if let Some(digit) = ch.to_digit(10) {
            row = row.checked_mul(10)?.checked_add(digit)?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if col == 0 || row == 0 || col > MAX_COLUMN || row > MAX_ROW {
        return None;
    }

    Some((col, row))
}

/// Convert a 1-based column index to its letter form (1 -> "A", 27 -> "AA").
pub fn col_to_letter(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Build an A1 reference from 1-based coordinates.
pub fn cell_ref(col: u32, row: u32) -> String {
    format!("{}{}", col_to_letter(col), row)
}
