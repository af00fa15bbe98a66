//! Utilities: logging setup (tracing on stderr, level from -v/-q unless RUST_LOG is set)
//! and small text helpers shared by the CLI commands.
//!
//! Key items:
//!   init_logging / derive_level
//!   truncate_chars

/// Logging helpers.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// `RUST_LOG` wins when set and valid; otherwise `level` for this crate, warn elsewhere.
    pub fn filter_for(level: LogLevel) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,{}={}",
                env!("CARGO_CRATE_NAME"),
                level.as_str()
            ))
        })
    }

    /// Install the global subscriber. Stdout carries the MCP protocol, so logs go to stderr.
    pub fn init_logging(level: LogLevel) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter_for(level))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/// Cut `s` to at most `max` characters, appending `...` when shortened.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::logging::*;
    use super::truncate_chars;

    #[test]
    fn level_from_flags() {
        assert_eq!(derive_level(0, true), LogLevel::Error);
        assert_eq!(derive_level(3, true), LogLevel::Error);
        assert_eq!(derive_level(0, false), LogLevel::Info);
        assert_eq!(derive_level(1, false), LogLevel::Debug);
        assert_eq!(derive_level(2, false), LogLevel::Trace);
    }

    #[test]
    fn default_filter_scopes_this_crate() {
        // Only meaningful when RUST_LOG is not set for the test run.
        if std::env::var_os("RUST_LOG").is_none() {
            let filter = filter_for(LogLevel::Debug).to_string();
            assert!(filter.contains("mcp_relay=debug"), "{filter}");
        }
    }

    #[test]
    fn truncation_is_char_aware() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 6), "abc...");
        assert_eq!(truncate_chars("ééééééé", 5), "éé...");
    }
}
