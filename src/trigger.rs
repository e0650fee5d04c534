use embedded_hal::{delay::DelayNs, digital::OutputPin};
use fugit::MicrosDurationU32;

/// Trigger line of the sensor.
///
/// A pulse is a busy-held high level; the sensor reacts to the width of the
/// pulse, so the hold must not yield to a scheduler.
pub struct TriggerPulse<TRIG> {
    pin: TRIG,
    width: MicrosDurationU32,
}

impl<TRIG: OutputPin> TriggerPulse<TRIG> {
    /// Parks the line low so the first pulse has a clean rising edge.
    pub fn new(mut pin: TRIG, width: MicrosDurationU32) -> Result<Self, TRIG::Error> {
        pin.set_low()?;
        Ok(Self { pin, width })
    }

    pub fn width(&self) -> MicrosDurationU32 {
        self.width
    }

    /// High, hold for the configured width, low.
    pub fn fire<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), TRIG::Error> {
        self.pin.set_high()?;
        delay.delay_us(self.width.ticks());
        self.pin.set_low()
    }

    pub fn release(self) -> TRIG {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        High,
        Low,
        Wait(u32),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        fail_high: bool,
    }

    struct RecPin<'a>(&'a core::cell::RefCell<Recorder>);

    impl ErrorType for RecPin<'_> {
        type Error = ErrorKind;
    }

    impl OutputPin for RecPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().events.push(Event::Low);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            let mut rec = self.0.borrow_mut();
            if rec.fail_high {
                return Err(ErrorKind::Other);
            }
            rec.events.push(Event::High);
            Ok(())
        }
    }

    struct RecDelay<'a>(&'a core::cell::RefCell<Recorder>);

    impl DelayNs for RecDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().events.push(Event::Wait(ns));
        }

        fn delay_us(&mut self, us: u32) {
            self.0.borrow_mut().events.push(Event::Wait(us * 1_000));
        }
    }

    #[test]
    fn new_parks_the_line_low() {
        let rec = core::cell::RefCell::new(Recorder::default());
        let _trigger = TriggerPulse::new(RecPin(&rec), MicrosDurationU32::from_ticks(15)).unwrap();
        assert_eq!(rec.borrow().events, vec![Event::Low]);
    }

    #[test]
    fn pulse_is_high_hold_low() {
        let rec = core::cell::RefCell::new(Recorder::default());
        let mut trigger =
            TriggerPulse::new(RecPin(&rec), MicrosDurationU32::from_ticks(15)).unwrap();
        rec.borrow_mut().events.clear();

        trigger.fire(&mut RecDelay(&rec)).unwrap();
        assert_eq!(
            rec.borrow().events,
            vec![Event::High, Event::Wait(15_000), Event::Low]
        );
    }

    #[test]
    fn failed_assert_skips_the_hold() {
        let rec = core::cell::RefCell::new(Recorder::default());
        let mut trigger =
            TriggerPulse::new(RecPin(&rec), MicrosDurationU32::from_ticks(15)).unwrap();
        rec.borrow_mut().events.clear();
        rec.borrow_mut().fail_high = true;

        assert_eq!(trigger.fire(&mut RecDelay(&rec)), Err(ErrorKind::Other));
        assert!(rec.borrow().events.is_empty());
    }
}
