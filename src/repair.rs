use crate::schema::{COUNTRY_ANCHOR, EXPECTED_COLS};

/// Rebuild an arbitrary-width row into exactly [`EXPECTED_COLS`] fields.
///
/// Rows damaged by unquoted commas in address or city text arrive with too
/// many or too few tokens. The literal "GB" Country token survives the
/// damage, so it is used as a pivot: tokens left of it become the address
/// block, tokens right of it become Zip and the phone fields. Total
/// function — every input, including an empty row, yields 12 strings, and
/// no token is ever dropped (overflow is folded into the last phone field).
pub fn reconstruct<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let row: Vec<String> = raw
        .iter()
        .map(|cell| cell.as_ref().trim().to_string())
        .collect();

    // Fast path: already the right width.
    if row.len() == EXPECTED_COLS {
        return row;
    }

    let mut out = vec![String::new(); EXPECTED_COLS];

    // First Name / Last Name / Email / Company sit before any of the
    // variable-length address text and keep their positions.
    for i in 0..row.len().min(4) {
        out[i] = row[i].clone();
    }

    if let Some(anchor) = find_country_anchor(&row) {
        // Province code is the token immediately before the country.
        if anchor >= 1 {
            out[7] = row[anchor - 1].clone();
        }
        out[8] = COUNTRY_ANCHOR.to_string();

        // Address1 / Address2 / City come from the tokens between Company
        // and the province code. The last token is the city; anything
        // between first and last collapses into Address2.
        let end = anchor.saturating_sub(1).max(4).min(row.len());
        let start = end.min(4);
        let left = &row[start..end];
        match left.len() {
            0 => {}
            1 => out[4] = left[0].clone(),
            2 => {
                out[4] = left[0].clone();
                out[6] = left[1].clone();
            }
            _ => {
                out[4] = left[0].clone();
                out[6] = left[left.len() - 1].clone();
                out[5] = left[1..left.len() - 1]
                    .iter()
                    .filter(|cell| !cell.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
            }
        }

        // Zip follows the country, then up to two phone tokens. Anything
        // past those is joined into Phone rather than dropped.
        let idx_zip = anchor + 1;
        out[9] = row.get(idx_zip).cloned().unwrap_or_default();

        let rest: &[String] = if idx_zip + 1 < row.len() {
            &row[idx_zip + 1..]
        } else {
            &[]
        };
        if let Some(first) = rest.first() {
            out[10] = first.clone();
        }
        if rest.len() >= 2 {
            out[11] = rest[1].clone();
        }
        if rest.len() > 2 {
            let extra = rest[2..].join(", ");
            let mut phone = out[11].clone();
            if !phone.is_empty() && !extra.is_empty() {
                phone.push_str(", ");
            }
            phone.push_str(&extra);
            out[11] = phone.trim_matches(|c: char| c == ',' || c == ' ').to_string();
        }
    } else {
        // No country token anywhere. Keep the first ten slots verbatim and
        // fold whatever trails into the phone fields.
        for (i, slot) in out.iter_mut().take(10).enumerate() {
            *slot = row.get(i).cloned().unwrap_or_default();
        }
        let phones: &[String] = if row.len() > 10 { &row[10..] } else { &[] };
        if let Some(first) = phones.first() {
            out[10] = first.clone();
        }
        if phones.len() >= 2 {
            out[11] = phones[1].clone();
        }
        if phones.len() > 2 {
            if !out[11].is_empty() {
                out[11].push_str(", ");
            }
            out[11].push_str(&phones[2..].join(", "));
        }
    }

    // Exactly 12 entries, whatever happened above.
    out.resize(EXPECTED_COLS, String::new());
    out
}

/// Two-pass anchor search. The country normally lands near index 8, so the
/// first pass takes the first "GB" at index 5 or later; only when that
/// fails does the second pass take the last "GB" anywhere. The pass order
/// is the tie-break for rows holding more than one "GB" token.
fn find_country_anchor(row: &[String]) -> Option<usize> {
    for (i, cell) in row.iter().enumerate() {
        if i >= 5 && cell.as_str() == COUNTRY_ANCHOR {
            return Some(i);
        }
    }
    for i in (0..row.len()).rev() {
        if row[i] == COUNTRY_ANCHOR {
            return Some(i);
        }
    }
    None
}
