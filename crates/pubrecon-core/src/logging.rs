//! Logging setup with indicatif integration, plus helpers for per-row log lines

use indicatif::MultiProgress;

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    }
}

/// Logger that prints through `MultiProgress::suspend` so lines do not tear progress bars.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }
        // only installed on a TTY, so color is always on
        let level = record.level();
        let line = format!(
            "[{}{}\x1b[0m] {}",
            level_color(level),
            level_label(level),
            record.args()
        );
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger.
///
/// `--debug` selects `debug`, `quiet` selects `warn`, otherwise `info`;
/// `RUST_LOG` overrides either. With `multi` set (TTY) log lines go through
/// the progress bars, else a plain `[LEVEL] message` format is used.
pub fn init_logging(
    quiet: bool,
    debug: bool,
    multi: Option<&MultiProgress>,
) -> Result<(), log::SetLoggerError> {
    use std::io::Write;

    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env = env_logger::Env::default().default_filter_or(default_level);

    match multi {
        Some(multi) => {
            let logger = env_logger::Builder::from_env(env).build();
            let max_level = logger.filter();
            log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone())))?;
            log::set_max_level(max_level);
            Ok(())
        }
        None => env_logger::Builder::from_env(env)
            .format(|buf, record| writeln!(buf, "[{}] {}", level_label(record.level()), record.args()))
            .try_init(),
    }
}

/// Shorten `text` to at most `max` characters for log lines, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate("Study of X", 50), "Study of X");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn truncate_long_text() {
        assert_eq!(truncate("Outcomes of surgical residents", 12), "Outcomes...");
        assert_eq!(truncate("Müller-Lüdenscheidt", 8).chars().count(), 8);
    }

    #[test]
    fn labels_are_padded() {
        assert_eq!(level_label(log::Level::Info).len(), 5);
        assert_eq!(level_label(log::Level::Warn), "WARN ");
    }
}
