//! JSON formatter for build reports.

use crate::build::BuildReport;

pub struct JsonFormatter;

pub fn print_json(report: &BuildReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}
