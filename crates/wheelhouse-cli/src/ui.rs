//! Terminal output: status lines and the installed-files listing.

use crossterm::style::Stylize;
use wheelhouse_core::InstallRecord;

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const INFO: &str = "ℹ";
}

/// Prints human-readable output unless quiet.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", icons::SUCCESS.green(), message.green());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", icons::INFO.dark_grey(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", icons::ERROR.red(), message.red());
    }

    /// One line per record: scheme, size and path.
    pub fn records(&self, records: &[InstallRecord]) {
        if self.quiet {
            return;
        }
        let width = records
            .iter()
            .map(|r| r.scheme.as_str().len())
            .max()
            .unwrap_or(0);
        for record in records {
            let size = record.entry.size.map(format_size).unwrap_or_default();
            let scheme = format!("{:<width$}", record.scheme.as_str());
            println!("  {}  {size:>9}  {}", scheme.dark_grey(), record.entry.path);
        }
    }
}

/// Format bytes for human-readable display
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}
