//! `log` backend that writes to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};

pub struct ConsoleLogger {
    level: LevelFilter,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    level: if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    },
};

/// Install the console logger; later calls are ignored.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LOGGER.level);
    }
}

#[must_use]
pub fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{level}] {target}: {message}")
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line: wasm_bindgen::JsValue = format_record(
            record.level(),
            record.target(),
            &record.args().to_string(),
        )
        .into();
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_carry_level_and_target() {
        assert_eq!(
            format_record(Level::Warn, "jonah_game::store", "save failed"),
            "[WARN] jonah_game::store: save failed"
        );
    }

    #[test]
    fn trace_records_are_filtered() {
        let meta = Metadata::builder()
            .level(Level::Trace)
            .target("jonah_web")
            .build();
        assert!(!LOGGER.enabled(&meta));
        let meta = Metadata::builder()
            .level(Level::Error)
            .target("jonah_web")
            .build();
        assert!(LOGGER.enabled(&meta));
    }
}
