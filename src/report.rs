//! Line-oriented text form of a ranging result, as read by the host tool.
//!
//! * `150`: echo width in microseconds
//! * `[23200] [-1]`: timeout, with the polls spent
//! * `[-2]`: measurement fault (inverted pair, pin error, busy)
use core::fmt;

use crate::{acquisition::Echo, error::Error};

const TIMEOUT_MARK: &str = "[-1]";
const FAULT_MARK: &str = "[-2]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    Echo(u32),
    Timeout(u32),
    Fault,
}

impl Reading {
    pub fn from_result<E>(result: &Result<Echo, Error<E>>) -> Self {
        match result {
            Ok(echo) => Reading::Echo(echo.micros()),
            Err(Error::Timeout { iterations }) => Reading::Timeout(*iterations),
            Err(_) => Reading::Fault,
        }
    }

    /// Parses one line, surrounding whitespace allowed.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line == FAULT_MARK {
            return Some(Reading::Fault);
        }
        if line.starts_with('[') {
            let mut parts = line.split_whitespace();
            let count = parts.next()?.strip_prefix('[')?.strip_suffix(']')?;
            if parts.next()? != TIMEOUT_MARK || parts.next().is_some() {
                return None;
            }
            return count.parse().ok().map(Reading::Timeout);
        }
        line.parse().ok().map(Reading::Echo)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Echo(us) => write!(f, "{}", us),
            Reading::Timeout(iterations) => write!(f, "[{}] {}", iterations, TIMEOUT_MARK),
            Reading::Fault => f.write_str(FAULT_MARK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{edge::EchoInstant, flag::EchoWindow};
    use fugit::MicrosDurationU32;

    fn echo(us: u32) -> Echo {
        Echo {
            window: EchoWindow {
                start: EchoInstant::from_ticks(0),
                stop: EchoInstant::from_ticks(us),
            },
            elapsed: MicrosDurationU32::from_ticks(us),
            iterations: 3,
        }
    }

    #[test]
    fn renders_each_outcome() {
        let ok: Result<Echo, Error<()>> = Ok(echo(150));
        assert_eq!(Reading::from_result(&ok).to_string(), "150");

        let timeout: Result<Echo, Error<()>> = Err(Error::Timeout { iterations: 23_200 });
        assert_eq!(Reading::from_result(&timeout).to_string(), "[23200] [-1]");

        let busy: Result<Echo, Error<()>> = Err(Error::Busy);
        assert_eq!(Reading::from_result(&busy).to_string(), "[-2]");
    }

    #[test]
    fn parses_lines() {
        assert_eq!(Reading::parse("150\n"), Some(Reading::Echo(150)));
        assert_eq!(Reading::parse("  [42] [-1]\n"), Some(Reading::Timeout(42)));
        assert_eq!(Reading::parse("[-2]\n"), Some(Reading::Fault));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Reading::parse(""), None);
        assert_eq!(Reading::parse("-150"), None);
        assert_eq!(Reading::parse("[42]"), None);
        assert_eq!(Reading::parse("[42] [-3]"), None);
        assert_eq!(Reading::parse("[42] [-1] 7"), None);
        assert_eq!(Reading::parse("[x] [-1]"), None);
    }

    #[test]
    fn text_survives_a_read_back() {
        for reading in [Reading::Echo(0), Reading::Timeout(7), Reading::Fault] {
            assert_eq!(Reading::parse(&format!("{}\n", reading)), Some(reading));
        }
    }
}
