// src/bin/check_widths.rs
//
// Width histogram for a delimited file: how many rows have how many
// fields. Handy for eyeballing an export before and after repair.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.csv>", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];

    let file = File::open(path).with_context(|| format!("opening {}", path))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut widths: BTreeMap<usize, u64> = BTreeMap::new();
    let mut total = 0u64;
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", path, idx))?;
        *widths.entry(record.len()).or_insert(0) += 1;
        total += 1;
    }

    println!("{: <10} {:>12}", "Width", "Rows");
    println!("{:-<23}", "");
    for (width, count) in &widths {
        println!("{: <10} {:>12}", width, count);
    }
    println!("{:-<23}", "");
    println!("{: <10} {:>12}", "total", total);

    Ok(())
}
