//! Shared formula expansion
//!
//! A shared formula is stored once on its master cell; every other cell in
//! the group only carries the group index. The dependent formula is the
//! master text with each relative reference moved by the offset between the
//! two cells.

use sheetward_core::{CellAddress, MAX_COLS, MAX_ROWS};

/// Move every relative A1 reference in `formula` by the given offset
///
/// String literals, quoted sheet names and bracketed parts are copied as they
/// are, as are function names and defined names that happen to look like
/// references. A reference pushed off the sheet becomes `#REF!`.
pub(crate) fn shift_formula(formula: &str, row_delta: i64, col_delta: i64) -> String {
    if row_delta == 0 && col_delta == 0 {
        return formula.to_string();
    }

    let bytes = formula.as_bytes();
    let mut out = String::with_capacity(formula.len() + 8);
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => {
                let end = quoted_end(bytes, i);
                out.push_str(&formula[i..end]);
                i = end;
            }
            b'[' => {
                let end = bytes[i..]
                    .iter()
                    .position(|&c| c == b']')
                    .map_or(bytes.len(), |p| i + p + 1);
                out.push_str(&formula[i..end]);
                i = end;
            }
            _ if is_token_byte(b) => {
                let end = token_end(bytes, i);
                let token = &formula[i..end];
                match shift_token(formula, i, end, row_delta, col_delta) {
                    Some(shifted) => out.push_str(&shifted),
                    None => out.push_str(token),
                }
                i = end;
            }
            _ => {
                let len = formula[i..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&formula[i..i + len]);
                i += len;
            }
        }
    }

    out
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'$'
}

fn token_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| !is_token_byte(b))
        .map_or(bytes.len(), |p| start + p)
}

/// End of a quoted run starting at `start`; a doubled quote is an escape
fn quoted_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RefToken {
    Cell {
        col_abs: bool,
        col: u32,
        row_abs: bool,
        row: u32,
    },
    Column {
        abs: bool,
        col: u32,
    },
    Row {
        abs: bool,
        row: u32,
    },
}

/// Replacement text for the token at `start..end`, `None` to keep it
fn shift_token(
    formula: &str,
    start: usize,
    end: usize,
    row_delta: i64,
    col_delta: i64,
) -> Option<String> {
    let bytes = formula.as_bytes();
    // Function calls and sheet prefixes are never references
    if matches!(bytes.get(end), Some(b'(') | Some(b'!')) {
        return None;
    }
    let token = &formula[start..end];

    let parsed = match parse_cell(token) {
        Some(cell) => cell,
        None => {
            let next = (bytes.get(end) == Some(&b':'))
                .then(|| &formula[end + 1..token_end(bytes, end + 1)]);
            let prev = (start > 0 && bytes[start - 1] == b':').then(|| {
                let prev_end = start - 1;
                let prev_start = bytes[..prev_end]
                    .iter()
                    .rposition(|&b| !is_token_byte(b))
                    .map_or(0, |p| p + 1);
                &formula[prev_start..prev_end]
            });
            let partner = |f: fn(&str) -> Option<RefToken>| {
                next.and_then(f).is_some() || prev.and_then(f).is_some()
            };

            if let Some(col) = parse_column(token).filter(|_| partner(parse_column)) {
                col
            } else if let Some(row) = parse_row(token).filter(|_| partner(parse_row)) {
                row
            } else {
                return None;
            }
        }
    };

    Some(match parsed {
        RefToken::Cell {
            col_abs,
            col,
            row_abs,
            row,
        } => {
            let col_shifted = shift(col, col_abs, col_delta, MAX_COLS);
            let row_shifted = shift(row, row_abs, row_delta, MAX_ROWS);
            match (col_shifted, row_shifted) {
                (Some(c), Some(r)) => format!(
                    "{}{}{}{}",
                    dollar(col_abs),
                    CellAddress::column_to_letters(c),
                    dollar(row_abs),
                    r
                ),
                _ => "#REF!".to_string(),
            }
        }
        RefToken::Column { abs, col } => match shift(col, abs, col_delta, MAX_COLS) {
            Some(c) => format!("{}{}", dollar(abs), CellAddress::column_to_letters(c)),
            None => "#REF!".to_string(),
        },
        RefToken::Row { abs, row } => match shift(row, abs, row_delta, MAX_ROWS) {
            Some(r) => format!("{}{}", dollar(abs), r),
            None => "#REF!".to_string(),
        },
    })
}

fn dollar(abs: bool) -> &'static str {
    if abs {
        "$"
    } else {
        ""
    }
}

fn shift(value: u32, abs: bool, delta: i64, max: u32) -> Option<u32> {
    if abs {
        return Some(value);
    }
    let shifted = value as i64 + delta;
    (1..=max as i64).contains(&shifted).then_some(shifted as u32)
}

fn split_dollar(s: &str) -> (bool, &str) {
    match s.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

fn column_value(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    CellAddress::letters_to_column(letters)
        .ok()
        .filter(|&c| c <= MAX_COLS)
}

fn row_value(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&r| (1..=MAX_ROWS).contains(&r))
}

fn parse_cell(token: &str) -> Option<RefToken> {
    let (col_abs, rest) = split_dollar(token);
    let split = rest.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, rest) = rest.split_at(split);
    let (row_abs, digits) = split_dollar(rest);
    Some(RefToken::Cell {
        col_abs,
        col: column_value(letters)?,
        row_abs,
        row: row_value(digits)?,
    })
}

fn parse_column(token: &str) -> Option<RefToken> {
    let (abs, letters) = split_dollar(token);
    Some(RefToken::Column {
        abs,
        col: column_value(letters)?,
    })
}

fn parse_row(token: &str) -> Option<RefToken> {
    let (abs, digits) = split_dollar(token);
    Some(RefToken::Row {
        abs,
        row: row_value(digits)?,
    })
}
