use anyhow::Result;
use std::collections::HashMap;
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

use tablescout::adapters::csv::read_csv_records;
use tablescout::{ExtractOptions, HeaderMode, Record};

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // Expect a file path, optionally a row count.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <CSV_FILE> [ROWS]", args[0]);
        exit(1);
    }
    let rows: usize = match args.get(2).map(|s| s.parse()) {
        None => 10,
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            eprintln!("ROWS must be a number");
            exit(1);
        }
    };

    if let Err(e) = dump(Path::new(&args[1]), rows) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

/// Print the first `rows` rows of the file as numbered raw records, for
/// eyeballing a file whose layout is unknown.
fn dump(path: &Path, rows: usize) -> Result<()> {
    let out = read_csv_records(
        path,
        &HeaderMode::None,
        &HashMap::new(),
        &ExtractOptions::default(),
    )?;

    println!("=== {} ===", path.display());
    for (n, record) in out.records.iter().take(rows).enumerate() {
        let Record::Row(cells) = record else {
            continue;
        };
        let line: Vec<String> = cells.iter().map(|v| v.to_string()).collect();
        println!("{:>4}: {}", n + 1, line.join(":"));
    }
    let total = out.records.len();
    if total > rows {
        println!("... {} more rows", total - rows);
    }

    Ok(())
}
