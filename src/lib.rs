//! Interrupt-driven pulse-width ranging for HC-SR04 style ultrasonic sensors.
//!
//! A ranging cycle is split across two execution contexts:
//!
//! * the caller, which owns a [`Sonar`] session, fires the trigger pulse and
//!   busy-polls for a result, and
//! * the echo-line interrupt, which owns an [`EdgeTimer`] and timestamps every
//!   edge of the echo pulse.
//!
//! The two meet at a [`RangingFlag`], which holds the cycle state and the
//! captured timestamps as a single value behind a critical section.
#![cfg_attr(not(test), no_std)]

pub mod acquisition;
pub mod config;
pub mod edge;
pub mod error;
pub mod flag;
pub mod report;
pub mod trigger;

pub use acquisition::{Echo, Sonar};
pub use config::Config;
pub use edge::{EchoClock, EchoInstant, EdgeKind, EdgeTimer};
pub use error::{ConfigError, Error, InitError};
pub use flag::{EchoWindow, FlagClaim, RangingFlag, RangingState};
pub use report::Reading;
pub use trigger::TriggerPulse;
