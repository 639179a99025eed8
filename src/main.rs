use anyhow::Result;
use custfix::{pipeline, schema::EXPECTED_COLS};
use std::{env, path::PathBuf, process};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: custfix <input.csv> <output.csv>");
        process::exit(1);
    }
    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);

    let stats = pipeline::repair_file(&input, &output)?;
    info!(
        read = stats.rows_read,
        written = stats.rows_written,
        reconstructed = stats.rows_reconstructed,
        "wrote {}",
        output.display()
    );

    // Advisory re-scan of the file just written; never changes the exit
    // code.
    let offenders = pipeline::scan_widths(&output)?;
    if offenders.is_empty() {
        println!("OK: All rows have {} columns.", EXPECTED_COLS);
    } else {
        println!("Warning: Non-{} column rows detected:", EXPECTED_COLS);
        for (row, cols) in offenders {
            println!("   row {} -> {} cols", row, cols);
        }
    }

    Ok(())
}
