//! Stderr logger: one `beep: <level>: <message>` line per record.

use std::fmt;
use std::io::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Logger writing to stderr, filtered by `log::max_level()`.
pub struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.args());
        // nowhere left to report a failed write to stderr
        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn format_line(level: Level, message: &fmt::Arguments<'_>) -> String {
    let level_str = match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    };
    format!("beep: {level_str}: {message}")
}

static LOGGER: StderrLogger = StderrLogger;

/// Install the logger with `max_level`. Returns `false`, changing nothing,
/// when a logger is already installed.
pub fn init(max_level: LevelFilter) -> bool {
    let installed = log::set_logger(&LOGGER).is_ok();
    if installed {
        log::set_max_level(max_level);
    }
    installed
}
