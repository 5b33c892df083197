//! Formatted output helpers for CLI commands.

use std::path::Path;

use tracing::level_filters::LevelFilter;

/// Maps the number of `-v` flags to the default log level.
#[must_use]
pub const fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Heading printed above the dependency report for `path`.
#[must_use]
pub fn report_header(path: &Path) -> String {
    format!("# Dependency data for {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_defaults_to_warnings() {
        assert_eq!(verbosity_level(0), LevelFilter::WARN);
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(verbosity_level(2), LevelFilter::DEBUG);
        assert_eq!(verbosity_level(3), LevelFilter::TRACE);
        assert_eq!(verbosity_level(9), LevelFilter::TRACE);
    }

    #[test]
    fn report_header_names_the_path() {
        assert_eq!(
            report_header(Path::new("/usr/share/ansible/collections")),
            "# Dependency data for /usr/share/ansible/collections"
        );
    }
}
