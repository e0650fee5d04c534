use embedded_hal::digital::InputPin;
use fugit::TimerInstantU32;

use crate::flag::RangingFlag;

/// Microsecond timestamp taken from the echo clock.
pub type EchoInstant = TimerInstantU32<1_000_000>;

/// Monotonic microsecond time source read from the echo interrupt.
pub trait EchoClock {
    fn now(&mut self) -> EchoInstant;
}

/// What an echo edge turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeKind {
    /// Line went high while armed: the echo pulse started.
    Start,
    /// Line went low after a recorded start: the cycle is complete.
    Stop,
    /// Outside the armed window, or a fall with no rise before it.
    Ignored,
}

/// Timestamps echo-line edges into a [`RangingFlag`].
///
/// Meant to be owned by the interrupt handler registered for both edge
/// polarities of the echo pin. The direction of an edge is taken from the pin
/// level sampled after it fired, not from which edge the interrupt was
/// configured for: dispatch may coalesce or reorder edge notifications, the
/// level after the fact is what counts.
pub struct EdgeTimer<'a, ECHO, CLK> {
    flag: &'a RangingFlag,
    echo: ECHO,
    clock: CLK,
}

impl<'a, ECHO, CLK> EdgeTimer<'a, ECHO, CLK>
where
    ECHO: InputPin,
    CLK: EchoClock,
{
    pub fn new(flag: &'a RangingFlag, echo: ECHO, clock: CLK) -> Self {
        Self { flag, echo, clock }
    }

    /// Handle one edge interrupt.
    ///
    /// Records at most one of the start or stop timestamps. A failed pin read
    /// is treated like any other noise on the line.
    pub fn on_edge(&mut self) -> EdgeKind {
        let now = self.clock.now();
        match self.echo.is_high() {
            Ok(level_high) => self.flag.latch(level_high, now),
            Err(_) => EdgeKind::Ignored,
        }
    }

    /// Access to the echo pin, e.g. to clear its interrupt pending bit.
    pub fn echo_mut(&mut self) -> &mut ECHO {
        &mut self.echo
    }

    pub fn release(self) -> (ECHO, CLK) {
        (self.echo, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::{EchoWindow, RangingState};
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct LevelPin {
        high: bool,
        broken: bool,
    }

    impl ErrorType for LevelPin {
        type Error = ErrorKind;
    }

    impl InputPin for LevelPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.broken {
                Err(ErrorKind::Other)
            } else {
                Ok(self.high)
            }
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|h| !h)
        }
    }

    struct StepClock(u32);

    impl EchoClock for StepClock {
        fn now(&mut self) -> EchoInstant {
            EchoInstant::from_ticks(self.0)
        }
    }

    fn edge(timer: &mut EdgeTimer<'_, LevelPin, StepClock>, t: u32, high: bool) -> EdgeKind {
        timer.clock.0 = t;
        timer.echo_mut().high = high;
        timer.on_edge()
    }

    fn timer(flag: &RangingFlag) -> EdgeTimer<'_, LevelPin, StepClock> {
        EdgeTimer::new(
            flag,
            LevelPin {
                high: false,
                broken: false,
            },
            StepClock(0),
        )
    }

    #[test]
    fn rise_then_fall_completes() {
        let flag = RangingFlag::new();
        let mut timer = timer(&flag);
        flag.arm().unwrap();

        assert_eq!(edge(&mut timer, 1_000, true), EdgeKind::Start);
        assert_eq!(flag.state(), RangingState::Armed);
        assert_eq!(edge(&mut timer, 1_150, false), EdgeKind::Stop);
        assert_eq!(
            flag.window(),
            Some(EchoWindow {
                start: EchoInstant::from_ticks(1_000),
                stop: EchoInstant::from_ticks(1_150),
            })
        );
    }

    #[test]
    fn falling_edge_while_unarmed_is_noop() {
        let flag = RangingFlag::new();
        let mut timer = timer(&flag);

        assert_eq!(edge(&mut timer, 10, false), EdgeKind::Ignored);
        assert_eq!(flag.state(), RangingState::Unarmed);
        assert_eq!(flag.window(), None);
    }

    #[test]
    fn stray_fall_before_rise_is_ignored() {
        let flag = RangingFlag::new();
        let mut timer = timer(&flag);
        flag.arm().unwrap();

        assert_eq!(edge(&mut timer, 20, false), EdgeKind::Ignored);
        assert_eq!(flag.state(), RangingState::Armed);
        assert_eq!(edge(&mut timer, 40, true), EdgeKind::Start);
        assert_eq!(edge(&mut timer, 90, false), EdgeKind::Stop);
        assert_eq!(flag.window().unwrap().width().unwrap().ticks(), 50);
    }

    #[test]
    fn edges_after_completion_are_ignored() {
        let flag = RangingFlag::new();
        let mut timer = timer(&flag);
        flag.arm().unwrap();
        edge(&mut timer, 40, true);
        edge(&mut timer, 90, false);

        assert_eq!(edge(&mut timer, 95, true), EdgeKind::Ignored);
        assert_eq!(edge(&mut timer, 99, false), EdgeKind::Ignored);
        assert_eq!(flag.window().unwrap().stop, EchoInstant::from_ticks(90));
    }

    #[test]
    fn unreadable_pin_is_noise() {
        let flag = RangingFlag::new();
        let mut timer = timer(&flag);
        flag.arm().unwrap();
        timer.echo_mut().broken = true;

        assert_eq!(edge(&mut timer, 40, true), EdgeKind::Ignored);
        assert_eq!(flag.state(), RangingState::Armed);
    }
}
