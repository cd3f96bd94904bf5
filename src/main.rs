//! Library Circulation CLI
//!
//! Loads the library's seed data, applies a batch of issue/return commands
//! and writes the resulting state as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- seed/ commands.csv > students.csv
//! cargo run -- seed/ commands.csv outstanding > open-loans.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `info`, `debug` or `warn` to control logging verbosity
//! - `LIBRARY_GRACE_DAYS`: Loan period in days (default 7)
//! - `LIBRARY_DAILY_FINE`: Fine per day late (default 2.00)

use library_circulation::{
    seed, write_report, CirculationError, CirculationPolicy, Report, Result,
};
use log::info;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(CirculationError::MissingArgument);
    }

    let report = match args.get(3) {
        Some(name) => name.parse::<Report>()?,
        None => Report::default(),
    };

    let policy = CirculationPolicy::from_env()?;
    let mut desk = seed::load_dir(Path::new(&args[1]), policy)?;

    let file = File::open(&args[2])?;
    let now = chrono::Local::now().naive_local();
    let summary = desk.process_commands(BufReader::new(file), now)?;
    info!(
        "Batch done: {} issued, {} returned, {} rejected",
        summary.issued, summary.returned, summary.rejected
    );

    let stdout = io::stdout();
    let handle = stdout.lock();
    write_report(&desk, report, handle)?;

    Ok(())
}
