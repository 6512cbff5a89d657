//! Output formatters for build reports.

pub mod human;
pub mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use crate::build::BuildReport;

/// Trait for printing build reports
pub trait Formatter {
    /// Format and print the report
    fn format(&self, report: &BuildReport);
}

impl Formatter for HumanFormatter {
    fn format(&self, report: &BuildReport) {
        human::print_report(report, &self.cwd);
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &BuildReport) {
        json::print_json(report);
    }
}
