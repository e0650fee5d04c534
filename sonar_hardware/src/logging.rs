#[cfg(feature = "defmt_logger")]
pub mod defmt_logger;

#[cfg(feature = "serial_logger")]
pub mod serial_logger;

pub use log::Level;
use log::{Log, Metadata, Record, SetLoggerError};

/// Forwards every record to each backend compiled in.
struct FanOut {
    sinks: &'static [&'static dyn Log],
}

static LOGGER: FanOut = FanOut {
    sinks: &[
        #[cfg(feature = "defmt_logger")]
        &defmt_logger::SINK,
        #[cfg(feature = "serial_logger")]
        &serial_logger::SINK,
    ],
};

/// Installs the fan-out logger. Backends are picked by cargo feature; the
/// serial backend only writes once it has been handed a port.
pub fn init(level: Level) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

impl Log for FanOut {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        for sink in self.sinks {
            sink.log(record);
        }
    }

    fn flush(&self) {
        self.sinks.iter().for_each(|sink| sink.flush());
    }
}
