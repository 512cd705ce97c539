//! Member log levels and subscriber installation.

use std::fmt;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// The classic member log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including per-event tracing.
    Finest,
    /// Lifecycle and registration messages.
    #[default]
    Info,
    /// Recoverable problems.
    Warning,
    /// Failures only.
    Severe,
    /// Nothing.
    Off,
}

impl LogLevel {
    /// The equivalent `tracing` filter.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Finest => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Severe => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }

    /// Maps a `tracing` filter back onto the nearest member level.
    pub fn from_level_filter(filter: LevelFilter) -> Self {
        if filter == LevelFilter::OFF {
            LogLevel::Off
        } else if filter >= LevelFilter::DEBUG {
            LogLevel::Finest
        } else if filter >= LevelFilter::INFO {
            LogLevel::Info
        } else if filter >= LevelFilter::WARN {
            LogLevel::Warning
        } else {
            LogLevel::Severe
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Finest => "FINEST",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Severe => "SEVERE",
            LogLevel::Off => "OFF",
        };
        f.write_str(name)
    }
}

/// Logging settings of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    level: LogLevel,
    ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a config for `level`.
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Enables or disables colored output.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Configured level.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether colored output is enabled.
    pub fn ansi(&self) -> bool {
        self.ansi
    }
}

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// if a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::Finest.level_filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::Info.level_filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Warning.level_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Severe.level_filter(), LevelFilter::ERROR);
        assert_eq!(LogLevel::Off.level_filter(), LevelFilter::OFF);
    }

    #[test]
    fn test_reverse_mapping() {
        assert_eq!(LogLevel::from_level_filter(LevelFilter::TRACE), LogLevel::Finest);
        assert_eq!(LogLevel::from_level_filter(LevelFilter::INFO), LogLevel::Info);
        assert_eq!(LogLevel::from_level_filter(LevelFilter::WARN), LogLevel::Warning);
        assert_eq!(LogLevel::from_level_filter(LevelFilter::ERROR), LogLevel::Severe);
        assert_eq!(LogLevel::from_level_filter(LevelFilter::OFF), LogLevel::Off);
    }

    #[test]
    fn test_display() {
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
    }

    #[test]
    fn test_init_twice_is_not_an_error() {
        let config = LoggingConfig::new(LogLevel::Severe).with_ansi(false);
        assert!(!config.ansi());
        init_logging(&config);
        assert!(!init_logging(&config));
    }
}
