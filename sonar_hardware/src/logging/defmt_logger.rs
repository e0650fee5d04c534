use defmt::{debug, error, info, trace, warn, Display2Format};
use defmt_rtt as _;
use log::{Level, Metadata, Record};

/// Re-emits `log` records as defmt frames over RTT.
pub(crate) struct DefmtLogger;

pub(super) static SINK: DefmtLogger = DefmtLogger;

impl log::Log for DefmtLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        let args = Display2Format(record.args());
        match record.metadata().level() {
            Level::Trace => trace!("{}", args),
            Level::Debug => debug!("{}", args),
            Level::Info => info!("{}", args),
            Level::Warn => warn!("{}", args),
            Level::Error => error!("{}", args),
        }
    }

    fn flush(&self) {}
}
