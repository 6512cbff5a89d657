//! Human-readable formatter for build reports.

use crate::build::BuildReport;
use colored::*;
use isodecl_core::paths;
use std::path::PathBuf;

pub struct HumanFormatter {
    /// Paths are shown relative to this directory.
    pub cwd: PathBuf,
}

pub fn print_report(report: &BuildReport, cwd: &std::path::Path) {
    let cwd = paths::to_slash(&cwd.to_string_lossy());

    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    for declaration in &report.declarations {
        let shown = display_path(&cwd, &declaration.path);
        if report.written {
            println!("  {} {}", "✓".green(), shown);
            if declaration.map.is_some() {
                println!("  {} {}.map", "✓".green(), shown);
            }
        } else {
            println!("{}", format!("// {shown}").cyan().bold());
            println!("{}", declaration.text.trim_end());
            println!();
        }
    }

    let verb = if report.written { "Wrote" } else { "Generated" };
    println!(
        "\n{} {} declaration file(s){}",
        verb,
        report.declarations.len().to_string().bold(),
        if report.warnings.is_empty() {
            String::new()
        } else {
            format!(", {} warning(s)", report.warnings.len()).yellow().to_string()
        }
    );
}

/// `path` relative to `cwd` when it lies inside it.
pub fn display_path(cwd: &str, path: &str) -> String {
    let relative = paths::relative(cwd, path);
    if relative.starts_with("..") || relative.is_empty() {
        path.to_string()
    } else {
        relative
    }
}
