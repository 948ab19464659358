use core::fmt;
use spin::Mutex;
use log::{self, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Output for formatted log lines; the library has no console of its own.
pub type Sink = fn(fmt::Arguments);

/// Installs the logger. Only the first call succeeds; later calls keep the first sink.
pub fn init(sink: Sink, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    *LOGGER.0.lock() = Some(sink);
    log::set_max_level(level);
    Ok(())
}

struct SimpleLogger(Mutex<Option<Sink>>);
static LOGGER: SimpleLogger = SimpleLogger(Mutex::new(None));

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // the sink may log again, so it runs unlocked
            let sink = *self.0.lock();
            if let Some(sink) = sink {
                sink(format_args!(
                    "\x1b[{}m[{}] [{}]: {}\x1b[0m",
                    level_to_color_code(record.level()),
                    record.level(),
                    record.target(),
                    record.args()
                ));
            }
        }
    }

    fn flush(&self) {}
}

fn level_to_color_code(level: Level) -> u8 {
    match level {
        Level::Error => 31, // Red
        Level::Warn => 93,  // BrightYellow
        Level::Info => 34,  // Blue
        Level::Debug => 32, // Green
        Level::Trace => 90, // BrightBlack
    }
}
