use sonar::EdgeKind;
use stm32f4xx_hal::gpio::{Output, PushPull, PD14};

pub type StatusLed = PD14<Output<PushPull>>;

/// Blinks once per captured echo.
pub fn show_edge(led: &mut StatusLed, kind: EdgeKind) {
    if kind == EdgeKind::Stop {
        led.toggle();
    }
}
