use embedded_hal::{delay::DelayNs, digital::OutputPin};
use fugit::MicrosDurationU32;
use log::{debug, error, warn};

use crate::{
    config::Config,
    error::{Error, InitError},
    flag::{EchoWindow, FlagClaim, RangingFlag},
    trigger::TriggerPulse,
};

/// A completed ranging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Echo {
    pub window: EchoWindow,
    /// Echo pulse width, proportional to the round-trip distance.
    pub elapsed: MicrosDurationU32,
    /// Polls spent waiting for the echo.
    pub iterations: u32,
}

impl Echo {
    pub fn micros(&self) -> u32 {
        self.elapsed.ticks()
    }
}

/// One physical sensor: its trigger line, the busy-delay used for both the
/// trigger hold and polling, and the flag its echo interrupt writes into.
///
/// A session claims its flag for as long as it lives, so no second session
/// can be built on it, and `measure` takes `&mut self`. Together they keep a
/// single cycle in flight per flag. The echo side lives in an
/// [`EdgeTimer`](crate::EdgeTimer) sharing the same flag.
pub struct Sonar<'a, TRIG, DELAY> {
    claim: FlagClaim<'a>,
    trigger: TriggerPulse<TRIG>,
    delay: DELAY,
    config: Config,
}

impl<'a, TRIG, DELAY> Sonar<'a, TRIG, DELAY>
where
    TRIG: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(
        flag: &'a RangingFlag,
        trig_pin: TRIG,
        delay: DELAY,
        config: Config,
    ) -> Result<Self, InitError<TRIG::Error>> {
        config.validate()?;
        let claim = flag.claim().ok_or(InitError::Busy)?;
        let trigger = TriggerPulse::new(trig_pin, config.trigger_width).map_err(InitError::Pin)?;
        flag.reset();

        Ok(Self {
            claim,
            trigger,
            delay,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The busy-delay, for pacing between cycles.
    pub fn delay_mut(&mut self) -> &mut DELAY {
        &mut self.delay
    }

    /// Runs one full ranging cycle.
    ///
    /// The flag is armed before the trigger line goes high, so even an
    /// immediate echo is caught, and it is back to unarmed whatever the
    /// outcome.
    ///
    /// The session leaves its flag unarmed at construction and after every
    /// cycle. Finding it anything else means a cycle was armed behind the
    /// session's back: that cycle is left alone and this one reports `Busy`.
    pub fn measure(&mut self) -> Result<Echo, Error<TRIG::Error>> {
        let flag = self.claim.flag();
        if let Err(state) = flag.arm() {
            warn!("flag is {:?}, another cycle is in flight", state);
            return Err(Error::Busy);
        }

        let outcome = match self.trigger.fire(&mut self.delay) {
            Ok(()) => self.await_echo(),
            Err(e) => Err(Error::Pin(e)),
        };

        flag.reset();
        outcome
    }

    fn await_echo(&mut self) -> Result<Echo, Error<TRIG::Error>> {
        let ceiling = self.config.poll_ceiling;
        let quantum = self.config.poll_quantum.ticks();

        let mut iterations = 0;
        loop {
            if let Some(window) = self.claim.flag().window() {
                return Self::settle(window, iterations);
            }
            if iterations >= ceiling {
                warn!("no echo after {} polls", iterations);
                return Err(Error::Timeout { iterations });
            }
            iterations += 1;
            self.delay.delay_us(quantum);
        }
    }

    fn settle(window: EchoWindow, iterations: u32) -> Result<Echo, Error<TRIG::Error>> {
        match window.width() {
            Some(elapsed) => {
                debug!("echo {} us after {} polls", elapsed.ticks(), iterations);
                Ok(Echo {
                    window,
                    elapsed,
                    iterations,
                })
            }
            None => {
                error!(
                    "echo stop {} precedes start {}",
                    window.stop.ticks(),
                    window.start.ticks()
                );
                Err(Error::InvertedPair(window))
            }
        }
    }

    /// Gives back the pins and the delay. The flag's claim ends here.
    pub fn release(self) -> (TRIG, DELAY) {
        (self.trigger.release(), self.delay)
    }
}
