#[cfg(target_arch = "wasm32")]
use log::Level;
use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

/// A logger that writes to stdout using println!
///
/// Used by native hosts, the headless backend and tests.
pub struct StdoutLogger;

/// A logger that forwards records to the browser console.
///
/// Error and warn records go to `console.error` / `console.warn` so they show
/// up highlighted in devtools; everything else goes to `console.info` or
/// `console.debug`.
#[cfg(target_arch = "wasm32")]
pub struct ConsoleLogger;

/// Render a record as a single line: `[LEVEL target file:line] message`.
///
/// wasm32-unknown-unknown has no wall clock through std, so lines carry no
/// timestamp; the console adds its own.
pub fn format_record(record: &Record) -> String {
    let file = record.file().unwrap_or("unknown");
    let line = record.line().unwrap_or(0);
    format!(
        "[{} {} {}:{}] {}",
        record.level(),
        record.target(),
        file,
        line,
        record.args()
    )
}

impl Log for StdoutLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        println!("{}", format_record(record));
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

#[cfg(target_arch = "wasm32")]
impl Log for ConsoleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format_record(record);
        match record.level() {
            Level::Error => web_sys::console::error_1(&line.into()),
            Level::Warn => web_sys::console::warn_1(&line.into()),
            Level::Info => web_sys::console::info_1(&line.into()),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line.into()),
        }
    }

    fn flush(&self) {}
}

/// Max level for the current build mode:
/// - Debug builds: LevelFilter::Debug
/// - Release builds: LevelFilter::Info
pub fn default_max_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the global logger for the current target.
///
/// Installs `ConsoleLogger` on wasm32 and `StdoutLogger` everywhere else.
///
/// This can only take effect once per process. Subsequent calls are silently ignored.
pub fn init_logger() {
    #[cfg(target_arch = "wasm32")]
    static LOGGER: ConsoleLogger = ConsoleLogger;
    #[cfg(not(target_arch = "wasm32"))]
    static LOGGER: StdoutLogger = StdoutLogger;

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(default_max_level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_format_record_contains_location() {
        let record = log::RecordBuilder::new()
            .level(Level::Warn)
            .target("glimpse")
            .file(Some("controller.rs"))
            .line(Some(42))
            .args(format_args!("autoplay prevented"))
            .build();

        let line = format_record(&record);
        assert_eq!(line, "[WARN glimpse controller.rs:42] autoplay prevented");
    }

    #[test]
    fn test_format_record_unknown_location() {
        let record = log::RecordBuilder::new()
            .level(Level::Info)
            .target("glimpse")
            .args(format_args!("ready"))
            .build();

        assert_eq!(format_record(&record), "[INFO glimpse unknown:0] ready");
    }
}
