#![no_main]
#![no_std]

use core::{cell::RefCell, fmt::Write};

use cortex_m_rt::entry;
use critical_section::Mutex;
use defmt::{error, info};
use embedded_hal::delay::DelayNs;
use panic_probe as _;
use stm32f4xx_hal::pac::{self, interrupt};

use sonar::{Config, EdgeTimer, RangingFlag, Reading, Sonar};
use sonar_hardware::{
    led::{self, StatusLed},
    logging::{self, serial_logger},
    ultrasonic::{service_echo, EchoTimer, SonarSession},
    SonarHardware,
};

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// HC-SR04 datasheet asks for at least 60 ms between cycles.
const CYCLE_PERIOD_MS: u32 = 60;

static FLAG: RangingFlag = RangingFlag::new();
static ECHO: Mutex<RefCell<Option<EchoTimer>>> = Mutex::new(RefCell::new(None));
static LED: Mutex<RefCell<Option<StatusLed>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    info!("{} v{}", NAME, VERSION);

    let dp = pac::Peripherals::take().expect("Failed to get device periph");
    let cp = cortex_m::peripheral::Peripherals::take().expect("Failed to get core periph");

    let hw = match SonarHardware::init(dp, cp) {
        Ok(hw) => hw,
        Err(e) => {
            error!("board init failed: {}", e);
            panic!();
        }
    };

    serial_logger::init(hw.dbg_serial);
    if logging::init(logging::Level::Info).is_err() {
        error!("logger already installed");
    }

    critical_section::with(|cs| {
        ECHO.borrow_ref_mut(cs)
            .replace(EdgeTimer::new(&FLAG, hw.echo, hw.clock));
        LED.borrow_ref_mut(cs).replace(hw.status_led);
    });
    // handler is in place, let the echo line through
    unsafe { pac::NVIC::unmask(pac::Interrupt::EXTI15_10) };

    let mut sonar: SonarSession<_> =
        match Sonar::new(&FLAG, hw.trigger, hw.delay, Config::default()) {
            Ok(s) => s,
            Err(e) => {
                error!("sonar init failed: {}", e);
                panic!();
            }
        };

    loop {
        let result = sonar.measure();
        let reading = Reading::from_result(&result);
        match result {
            Ok(echo) => log::info!("echo {} us", echo.micros()),
            Err(e) => log::warn!("ranging failed: {}", e),
        }
        serial_logger::with_port(|tx| {
            let _ = writeln!(tx, "{}\r", reading);
        });

        sonar.delay_mut().delay_ms(CYCLE_PERIOD_MS);
    }
}

#[interrupt]
fn EXTI15_10() {
    critical_section::with(|cs| {
        if let Some(timer) = ECHO.borrow_ref_mut(cs).as_mut() {
            let kind = service_echo(timer);
            if let Some(status) = LED.borrow_ref_mut(cs).as_mut() {
                led::show_edge(status, kind);
            }
        }
    });
}
