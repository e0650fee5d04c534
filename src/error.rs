use core::fmt;

use crate::flag::EchoWindow;

/// Per-cycle ranging faults. None of these poison the session; the caller
/// may simply try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// No echo completed within the polling budget.
    Timeout { iterations: u32 },
    /// Stop timestamp precedes the start, an edge was missed.
    InvertedPair(EchoWindow),
    /// The flag was not idle when the cycle tried to arm it, someone else
    /// has a cycle in flight.
    Busy,
    /// Driving the trigger pin failed.
    Pin(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Timeout { iterations } => {
                write!(f, "no echo after {} polls", iterations)
            }
            Error::InvertedPair(window) => write!(
                f,
                "echo stop {} before start {}",
                window.stop.ticks(),
                window.start.ticks()
            ),
            Error::Busy => f.write_str("ranging cycle already in flight"),
            Error::Pin(e) => write!(f, "trigger pin error: {:?}", e),
        }
    }
}

/// Rejected [`Config`](crate::Config) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    TriggerTooShort { width_us: u32 },
    ZeroQuantum,
    ZeroCeiling,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TriggerTooShort { width_us } => {
                write!(f, "trigger width {} us is below the sensor minimum", width_us)
            }
            ConfigError::ZeroQuantum => f.write_str("poll quantum must be non-zero"),
            ConfigError::ZeroCeiling => f.write_str("poll ceiling must be non-zero"),
        }
    }
}

/// Faults that keep a session from ever being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError<E> {
    Config(ConfigError),
    /// Another session already drives this flag.
    Busy,
    /// The trigger line could not be parked low.
    Pin(E),
}

impl<E> From<ConfigError> for InitError<E> {
    fn from(e: ConfigError) -> Self {
        InitError::Config(e)
    }
}

impl<E: fmt::Debug> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Config(e) => write!(f, "invalid config: {}", e),
            InitError::Busy => f.write_str("ranging flag already claimed by another session"),
            InitError::Pin(e) => write!(f, "trigger pin error: {:?}", e),
        }
    }
}
