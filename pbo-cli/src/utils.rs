//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use pbo_core::{Entry, Property};
use std::path::Path;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb
}

/// Check if a name matches the filter patterns.
/// - If exclude patterns are specified, the name must not match any
/// - If include patterns are specified, the name must match at least one
pub fn matches_filters(name: &str, include: &[Pattern], exclude: &[Pattern]) -> bool {
    if exclude.iter().any(|p| p.matches(name)) {
        return false;
    }

    include.is_empty() || include.iter().any(|p| p.matches(name))
}

/// Compile glob patterns, rejecting the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, glob::PatternError> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

/// Name used for filtering and printing: the host-form path.
pub fn display_name(entry: &Entry) -> String {
    entry.host_path().display().to_string()
}

/// Filter entries based on include/exclude patterns.
pub fn filter_entries<'a>(
    entries: &'a [Entry],
    include: &[Pattern],
    exclude: &[Pattern],
) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|e| e.is_regular())
        .filter(|e| matches_filters(&display_name(e), include, exclude))
        .collect()
}

/// Parse a `KEY=VALUE` property argument.
pub fn parse_property(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some(("", _)) => Err("property key must not be empty".to_string()),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{arg}'")),
    }
}

/// Print metadata properties, one `key = value` per line.
pub fn print_properties(properties: &[Property]) {
    if properties.is_empty() {
        return;
    }
    println!("Properties:");
    for prop in properties {
        println!("  {} = {}", prop.key_lossy(), prop.value_lossy());
    }
    println!();
}

/// Print entries in a formatted table.
pub fn print_table(entries: &[&Entry]) {
    println!("{:>10} {:>10} {:>10}  Name", "Size", "Offset", "Timestamp");
    println!("{}", "-".repeat(60));

    let mut total_size = 0u64;
    for entry in entries {
        println!(
            "{:>10} {:>10} {:>10}  {}",
            entry.original_size,
            entry.offset,
            entry.timestamp,
            display_name(entry)
        );
        total_size += u64::from(entry.original_size);
    }

    println!("{}", "-".repeat(60));
    println!("{:>10} {:>22}  {} files", total_size, "", entries.len());
}

/// Whether an archive path argument names a standard stream.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<Pattern> {
        list.iter().map(|p| Pattern::new(p).unwrap()).collect()
    }

    #[test]
    fn test_matches_filters() {
        let none: Vec<Pattern> = Vec::new();
        assert!(matches_filters("config.cpp", &none, &none));

        let include = patterns(&["*.cpp"]);
        assert!(matches_filters("config.cpp", &include, &none));
        assert!(!matches_filters("model.p3d", &include, &none));

        let exclude = patterns(&["config.*"]);
        assert!(!matches_filters("config.cpp", &include, &exclude));
    }

    #[test]
    fn test_filter_entries() {
        let entries = vec![
            Entry::regular(&b"config.cpp"[..], 1),
            Entry::regular(&b"data.bin"[..], 1),
        ];
        let filtered = filter_entries(&entries, &patterns(&["*.bin"]), &[]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, b"data.bin");
    }

    #[test]
    fn test_parse_property() {
        assert_eq!(
            parse_property("prefix=x\\addon").unwrap(),
            ("prefix".to_string(), "x\\addon".to_string())
        );
        assert_eq!(
            parse_property("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert_eq!(
            parse_property("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_property("novalue").is_err());
        assert!(parse_property("=value").is_err());
    }

    #[test]
    fn test_compile_patterns() {
        assert_eq!(compile_patterns(&["*.txt".to_string()]).unwrap().len(), 1);
        assert!(compile_patterns(&["[".to_string()]).is_err());
    }

    #[test]
    fn test_is_stdio() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("archive.pbo")));
    }
}
