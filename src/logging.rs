//! Debug logging to stderr
//!
//! The library logs through the `log` facade. Binaries call [`init`] to print
//! those records as `[LEVEL] target message` lines.

use log::{Level, LevelFilter};
use std::io::Write;

/// Environment variable that turns debug output on without `--debug`
pub const DEBUG_ENV: &str = "VNSCRIPT_DEBUG";

fn level_str(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRACE",
        Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warn => "WARN",
        Level::Error => "ERROR",
    }
}

fn format_record(level: Level, target: &str, message: &std::fmt::Arguments) -> String {
    format!("[{}] {:10} {}", level_str(level), target, message)
}

/// Level used for a given debug switch
pub fn level_for(debug: bool) -> LevelFilter {
    if debug || std::env::var_os(DEBUG_ENV).is_some() {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Install the stderr logger. Calling it again only updates the level.
pub fn init(debug: bool) {
    // The facade's max level does the filtering so later calls can change it
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_record(record.level(), record.target(), record.args())
            )
        })
        .try_init();
    log::set_max_level(level_for(debug));
}
