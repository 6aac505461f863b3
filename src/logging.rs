// log sinks: devtools console in the browser, env_logger natively

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// Forwards `log` records to `console.*`, tagged the way the rest of the
/// page's console output is.
pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[vault::{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Info);

/// Installs the console logger. Safe to call more than once.
pub fn init_console_logger() {
    if log::set_logger(&CONSOLE_LOGGER).is_ok() {
        log::set_max_level(CONSOLE_LOGGER.level);
    }
}

/// Installs `env_logger` for the native REPL, defaulting to warnings only.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_native_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();
}
