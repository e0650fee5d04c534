use fugit::MicrosDurationU32;

use crate::error::ConfigError;

/// Shortest trigger pulse the HC-SR04 datasheet accepts.
pub const MIN_TRIGGER_WIDTH: MicrosDurationU32 = MicrosDurationU32::from_ticks(10);

/// Trigger pulse width used unless configured otherwise.
pub const TRIGGER_WIDTH: MicrosDurationU32 = MicrosDurationU32::from_ticks(15);

/// Busy-delay between two checks of the ranging flag.
pub const POLL_QUANTUM: MicrosDurationU32 = MicrosDurationU32::from_ticks(1);

/// Polls before giving up on the echo.
///
/// 4 m rated range, there and back at 343 m/s, is roughly 23.2 ms.
pub const POLL_CEILING: u32 = 23_200;

/// Timing of a ranging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub trigger_width: MicrosDurationU32,
    pub poll_quantum: MicrosDurationU32,
    pub poll_ceiling: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_width: TRIGGER_WIDTH,
            poll_quantum: POLL_QUANTUM,
            poll_ceiling: POLL_CEILING,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_trigger_width(self, width: MicrosDurationU32) -> Self {
        let mut s = self;
        s.trigger_width = width;
        s
    }

    pub fn set_poll_quantum(self, quantum: MicrosDurationU32) -> Self {
        let mut s = self;
        s.poll_quantum = quantum;
        s
    }

    pub fn set_poll_ceiling(self, ceiling: u32) -> Self {
        let mut s = self;
        s.poll_ceiling = ceiling;
        s
    }

    /// Longest echo the polling budget can wait for.
    pub fn max_round_trip(&self) -> MicrosDurationU32 {
        MicrosDurationU32::from_ticks(self.poll_quantum.ticks().saturating_mul(self.poll_ceiling))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_width < MIN_TRIGGER_WIDTH {
            return Err(ConfigError::TriggerTooShort {
                width_us: self.trigger_width.ticks(),
            });
        }
        if self.poll_quantum.ticks() == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        if self.poll_ceiling == 0 {
            return Err(ConfigError::ZeroCeiling);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.trigger_width.ticks(), 15);
        assert_eq!(config.max_round_trip().ticks(), 23_200);
    }

    #[test]
    fn builder() {
        let config = Config::new()
            .set_trigger_width(MicrosDurationU32::from_ticks(12))
            .set_poll_quantum(MicrosDurationU32::from_ticks(2))
            .set_poll_ceiling(500);
        assert_eq!(config.trigger_width.ticks(), 12);
        assert_eq!(config.max_round_trip().ticks(), 1_000);
    }

    #[test]
    fn rejects_short_trigger() {
        let config = Config::new().set_trigger_width(MicrosDurationU32::from_ticks(9));
        assert_eq!(
            config.validate(),
            Err(ConfigError::TriggerTooShort { width_us: 9 })
        );
    }

    #[test]
    fn rejects_empty_poll_budget() {
        let config = Config::new().set_poll_quantum(MicrosDurationU32::from_ticks(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroQuantum));

        let config = Config::new().set_poll_ceiling(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCeiling));
    }

    #[test]
    fn round_trip_saturates() {
        let config = Config::new()
            .set_poll_quantum(MicrosDurationU32::from_ticks(u32::MAX))
            .set_poll_ceiling(2);
        assert_eq!(config.max_round_trip().ticks(), u32::MAX);
    }
}
