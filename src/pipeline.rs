use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};
use tracing::{debug, info};

use crate::repair::reconstruct;
use crate::schema::{EXPECTED_COLS, HEADERS};

/// A simple accumulator for one repair pass over a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairStats {
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_reconstructed: u64,
    pub rows_passed_through: u64,
    pub blank_rows_skipped: u64,
    pub header_replaced: bool,
}

/// Read `input`, force every data row to [`EXPECTED_COLS`] fields, write to
/// `output`.
///
/// The canonical header is always written first. If the file's first
/// non-blank row is its own header it is dropped; otherwise it is repaired
/// and written as data. Rows whose every token is blank contribute nothing.
/// Output row order equals input row order.
pub fn repair_file(input: &Path, output: &Path) -> Result<RepairStats> {
    let in_file =
        File::open(input).with_context(|| format!("opening input {}", input.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(in_file));

    let out_file =
        File::create(output).with_context(|| format!("creating output {}", output.display()))?;
    let mut wtr = WriterBuilder::new().from_writer(BufWriter::new(out_file));

    let mut stats = RepairStats::default();
    let mut wrote_header = false;

    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", input.display(), idx))?;
        stats.rows_read += 1;

        if is_blank(&record) {
            stats.blank_rows_skipped += 1;
            continue;
        }

        if !wrote_header {
            wrote_header = true;
            wtr.write_record(HEADERS).context("writing header row")?;
            if is_original_header(&record) {
                stats.header_replaced = true;
                debug!("input header detected; replaced with canonical header");
                continue;
            }
        }

        let tokens: Vec<&str> = record.iter().collect();
        if tokens.len() == EXPECTED_COLS {
            stats.rows_passed_through += 1;
        } else {
            stats.rows_reconstructed += 1;
            debug!(record = idx, width = tokens.len(), "reconstructing row");
        }
        let fixed = reconstruct(&tokens);
        wtr.write_record(&fixed)
            .with_context(|| format!("writing record {}", idx))?;
        stats.rows_written += 1;
    }

    wtr.flush().context("flushing output")?;
    info!(
        read = stats.rows_read,
        written = stats.rows_written,
        reconstructed = stats.rows_reconstructed,
        blank_skipped = stats.blank_rows_skipped,
        "repair pass complete"
    );
    Ok(stats)
}

/// Re-read a written file and list every row whose width is not
/// [`EXPECTED_COLS`], as `(1-based row index, field count)` pairs.
///
/// Advisory self-check on the write layer; the reconstructor itself
/// guarantees 12 fields per row.
pub fn scan_widths(path: &Path) -> Result<Vec<(usize, usize)>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut offenders = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        if record.len() != EXPECTED_COLS {
            offenders.push((idx + 1, record.len()));
        }
    }
    Ok(offenders)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Case-insensitive check for the export's own header row: it must carry
/// "First Name", "Last Name" and "Email" tokens somewhere.
fn is_original_header(record: &StringRecord) -> bool {
    let lowered: Vec<String> = record.iter().map(|c| c.trim().to_lowercase()).collect();
    ["first name", "last name", "email"]
        .iter()
        .all(|key| lowered.iter().any(|cell| cell == key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut rows = Vec::new();
        for rec in rdr.records() {
            rows.push(rec?.iter().map(|c| c.to_string()).collect());
        }
        Ok(rows)
    }

    #[test]
    fn replaces_input_header_and_fixes_widths() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("customers.csv");
        let output = dir.path().join("customers_fixed.csv");

        // Ada's row has 13 fields (an unquoted comma split her address);
        // Bob's is already well-formed. A separator-only row sits between
        // them.
        let data = "\
First Name,Last Name,Email,Default Address Company,Default Address Address1,Default Address Address2,Default Address City,Default Address Province Code,Country,Zip,Default Address Phone,Phone
Ada,Lovelace,ada@example.com,,1 Main St,Flat 2,Central,London,LND,GB,E1 6AN,020111,020222
,,,,,
Bob,Byrne,bob@example.com,,2 High St,,Leeds,LDS,GB,LS1 1AA,0113111,0113222
";
        fs::write(&input, data)?;

        let stats = repair_file(&input, &output)?;
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_written, 2);
        assert_eq!(stats.rows_reconstructed, 1);
        assert_eq!(stats.rows_passed_through, 1);
        assert_eq!(stats.blank_rows_skipped, 1);
        assert!(stats.header_replaced);

        let rows = read_rows(&output)?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], HEADERS);
        assert_eq!(
            rows[1],
            vec![
                "Ada",
                "Lovelace",
                "ada@example.com",
                "",
                "1 Main St",
                "Flat 2, Central",
                "London",
                "LND",
                "GB",
                "E1 6AN",
                "020111",
                "020222",
            ]
        );
        assert_eq!(rows[2][4], "2 High St");
        assert_eq!(rows[2][6], "Leeds");
        for row in &rows {
            assert_eq!(row.len(), EXPECTED_COLS);
        }
        Ok(())
    }

    #[test]
    fn first_row_without_header_names_is_data() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");

        let data = "Ada,Lovelace,ada@example.com,,1 Main St,,London,LND,GB,E1 6AN,020111,020222\n";
        fs::write(&input, data)?;

        let stats = repair_file(&input, &output)?;
        assert!(!stats.header_replaced);
        assert_eq!(stats.rows_written, 1);

        let rows = read_rows(&output)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], HEADERS);
        assert_eq!(rows[1][0], "Ada");
        Ok(())
    }

    #[test]
    fn blank_rows_before_header_do_not_consume_it() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");

        let data = "\
,,,
first name,last name,email,company,address1,address2,city,province code,country,zip,phone,phone
Ada,Lovelace,ada@example.com,,1 Main St,,London,LND,GB,E1 6AN,020111,020222
";
        fs::write(&input, data)?;

        let stats = repair_file(&input, &output)?;
        assert!(stats.header_replaced);
        assert_eq!(stats.blank_rows_skipped, 1);

        let rows = read_rows(&output)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], HEADERS);
        assert_eq!(rows[1][0], "Ada");
        Ok(())
    }

    #[test]
    fn quoted_commas_stay_one_field() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");

        let data = "Ada,Lovelace,ada@example.com,,\"1 Main St, Flat 2\",,London,LND,GB,E1 6AN,020111,020222\n";
        fs::write(&input, data)?;

        let stats = repair_file(&input, &output)?;
        assert_eq!(stats.rows_passed_through, 1);

        let rows = read_rows(&output)?;
        assert_eq!(rows[1][4], "1 Main St, Flat 2");
        assert_eq!(rows[1].len(), EXPECTED_COLS);
        Ok(())
    }

    #[test]
    fn scan_widths_flags_wrong_width_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("mixed.csv");

        let data = "a,b,c\na,b,c,d,e,f,g,h,i,j,k,l\na,b\n";
        fs::write(&path, data)?;

        let offenders = scan_widths(&path)?;
        assert_eq!(offenders, vec![(1, 3), (3, 2)]);
        Ok(())
    }

    #[test]
    fn scan_widths_accepts_repaired_output() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");

        // Widths 13, 12, 9 and 15 on the way in.
        let data = "\
Ada,Lovelace,ada@example.com,,1 Main St,Flat 2,Central,London,LND,GB,E1 6AN,020111,020222
Bob,Byrne,bob@example.com,,2 High St,,Leeds,LDS,GB,LS1 1AA,0113111,0113222
Cat,Cole,cat@example.com,,3 Low Rd,York,YRK,NE,90210
Dan,Dunn,dan@example.com,,4 Old Ln,Unit 9,Rear,Hull,HUL,GB,HU1 1AA,01482111,01482222,01482333,01482444
";
        fs::write(&input, data)?;

        repair_file(&input, &output)?;
        assert!(scan_widths(&output)?.is_empty());
        Ok(())
    }
}
