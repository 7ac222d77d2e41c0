//! Output formatting utilities

use analyzer_lib::export::KB_PER_GIB;
use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Resolve the effective output format: the flag wins, then the config
/// file's default, then table.
pub fn resolve_format(flag: Option<OutputFormat>, configured: Option<&str>) -> OutputFormat {
    flag.or_else(|| {
        configured.and_then(|name| <OutputFormat as ValueEnum>::from_str(name, true).ok())
    })
    .unwrap_or_default()
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a signed millicore change
pub fn format_millicores(change: f64) -> String {
    format!("{:+.0} mc", change)
}

/// Format a signed memory change, converting KB to GiB
pub fn format_memory_gib(change_kb: f64) -> String {
    format!("{:+.2} GiB", change_kb / KB_PER_GIB)
}

/// Format a signed percentage
pub fn format_pct(pct: f64) -> String {
    format!("{:+.1}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millicores() {
        assert_eq!(format_millicores(400.0), "+400 mc");
        assert_eq!(format_millicores(-1234.6), "-1235 mc");
    }

    #[test]
    fn test_format_memory_gib() {
        assert_eq!(format_memory_gib(1.5 * KB_PER_GIB), "+1.50 GiB");
        assert_eq!(format_memory_gib(-0.25 * KB_PER_GIB), "-0.25 GiB");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(33.333), "+33.3%");
        assert_eq!(format_pct(0.0), "+0.0%");
    }

    #[test]
    fn test_resolve_format_precedence() {
        // The flag always wins over the configured default.
        assert_eq!(
            resolve_format(Some(OutputFormat::Json), Some("table")),
            OutputFormat::Json
        );
        // No flag: the config file's default applies, case-insensitively.
        assert_eq!(resolve_format(None, Some("json")), OutputFormat::Json);
        assert_eq!(resolve_format(None, Some("JSON")), OutputFormat::Json);
        // Unknown configured names fall back to table.
        assert_eq!(resolve_format(None, Some("yaml")), OutputFormat::Table);
        assert_eq!(resolve_format(None, None), OutputFormat::Table);
    }
}
