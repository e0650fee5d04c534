use core::{cell::RefCell, fmt::Write};

use critical_section::Mutex;
use log::{Level, Metadata, Record};

use crate::serial::DebugSerialPort;

pub(crate) struct SerialLogger;

pub(super) static SINK: SerialLogger = SerialLogger;
static PORT: Mutex<RefCell<Option<DebugSerialPort>>> = Mutex::new(RefCell::new(None));

/// Hands the debug port to the logger. Until then serial log lines are dropped.
pub fn init(port: DebugSerialPort) {
    critical_section::with(|cs| {
        PORT.borrow_ref_mut(cs).replace(port);
    });
}

/// Writes through the logger's port, e.g. for output that is not a log line.
pub fn with_port<R>(f: impl FnOnce(&mut DebugSerialPort) -> R) -> Option<R> {
    critical_section::with(|cs| PORT.borrow_ref_mut(cs).as_mut().map(f))
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        let level = match record.metadata().level() {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        };

        // a dropped log line is not worth a fault
        with_port(|tx| {
            let _ = write!(tx, "{}: {}\r\n", level, record.args());
        });
    }

    fn flush(&self) {}
}
