use std::io::{self, Write};

use serde::Serialize;

use crate::walker::RunReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Summary,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &RunReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub fn print_summary(report: &RunReport) {
    println!("artwork summary");
    println!("  titles processed: {}", report.titles_processed);
    println!("  assets downloaded: {}", report.assets_saved);
    println!("  already present: {}", report.assets_present);
    println!("  failed: {}", report.assets_failed);
    if report.titles_not_found > 0 {
        println!("  titles without metadata: {}", report.titles_not_found);
    }
}
