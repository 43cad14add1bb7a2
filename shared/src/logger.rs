use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Installs the process-wide logger. Safe to call more than once, later
/// calls are ignored.
pub fn init() {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let level = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN ".yellow().bold(),
                Level::Info => "INFO ".green(),
                Level::Debug => "DEBUG".blue(),
                Level::Trace => "TRACE".magenta(),
            };
            writeln!(
                buf,
                "[{} {} {}] {}",
                timestamp,
                level,
                record.target(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_default_env();

    _ = builder.try_init();
}
