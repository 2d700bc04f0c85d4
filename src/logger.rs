use std::io::Write;

use chrono::prelude::*;
use log::{Level, LevelFilter, Metadata, Record};

const TARGET: &str = "tunedb";

pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(Logger { level }))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn short_target(target: &str) -> &str {
    target.strip_prefix("tunedb::").unwrap_or(target)
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(TARGET)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let stderr = std::io::stderr();
        let mut out = stderr.lock();

        let _ = writeln!(
            out,
            "{} {} {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level_name(record.level()),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_crate_prefix() {
        assert_eq!(short_target("tunedb::scan"), "scan");
        assert_eq!(short_target("tunedb"), "tunedb");
    }

    #[test]
    fn filters_foreign_targets_and_levels() {
        let logger = Logger {
            level: LevelFilter::Info,
        };
        let ours = Metadata::builder()
            .target("tunedb::store")
            .level(Level::Info)
            .build();
        let foreign = Metadata::builder()
            .target("rusqlite")
            .level(Level::Error)
            .build();
        let verbose = Metadata::builder()
            .target("tunedb::store")
            .level(Level::Debug)
            .build();

        assert!(log::Log::enabled(&logger, &ours));
        assert!(!log::Log::enabled(&logger, &foreign));
        assert!(!log::Log::enabled(&logger, &verbose));
    }
}
