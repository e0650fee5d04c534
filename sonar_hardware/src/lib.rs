#![no_std]

use core::fmt;

use stm32f4xx_hal::{
    gpio::Edge,
    pac::{CorePeripherals, Peripherals},
    prelude::*,
    timer::SysDelay,
};

pub mod led;
pub mod logging;
pub mod serial;
pub mod ultrasonic;

use led::StatusLed;
use serial::DebugSerialPort;
use ultrasonic::{CounterClock, EchoPin, TriggerPin};

/// Board bring-up failures. Any of these means no ranging cycle may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum InitError {
    /// Debug USART rejected its configuration.
    Serial,
    /// Echo counter could not be started.
    Timer,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Serial => f.write_str("debug serial setup failed"),
            InitError::Timer => f.write_str("echo counter setup failed"),
        }
    }
}

/// Everything the ranging firmware needs from an STM32F4-Discovery.
///
/// The echo pin is already an EXTI source on both edges; its NVIC line is
/// left masked until the edge handler is in place.
pub struct SonarHardware {
    pub delay: SysDelay,
    pub status_led: StatusLed,
    pub dbg_serial: DebugSerialPort,
    pub trigger: TriggerPin,
    pub echo: EchoPin,
    pub clock: CounterClock,
}

impl SonarHardware {
    pub fn init(mut pac: Peripherals, core: CorePeripherals) -> Result<Self, InitError> {
        let mut syscfg = pac.SYSCFG.constrain();

        let rcc = pac.RCC.constrain();
        let clocks = rcc.cfgr.sysclk(168.MHz()).freeze();
        let delay = core.SYST.delay(&clocks);

        let gpioa = pac.GPIOA.split();
        let gpiob = pac.GPIOB.split();
        let gpiod = pac.GPIOD.split();

        let status_led = gpiod.pd14.into_push_pull_output();

        let debug_tx_pin = gpioa.pa9.into_alternate();
        let dbg_serial = pac
            .USART1
            .tx(debug_tx_pin, 115200.bps(), &clocks)
            .map_err(|_| InitError::Serial)?;

        let trigger = gpiob.pb11.into_push_pull_output();
        let mut echo = gpiob.pb10.into_pull_down_input();
        echo.make_interrupt_source(&mut syscfg);
        echo.trigger_on_edge(&mut pac.EXTI, Edge::RisingFalling);
        echo.enable_interrupt(&mut pac.EXTI);

        let clock = CounterClock::start(pac.TIM5.counter_us(&clocks)).map_err(|_| InitError::Timer)?;

        Ok(Self {
            delay,
            status_led,
            dbg_serial,
            trigger,
            echo,
            clock,
        })
    }
}
