use sonar::{EchoClock, EchoInstant, EdgeKind, EdgeTimer, Sonar};
use stm32f4xx_hal::{
    gpio::{ExtiPin, Input, Output, Pin, PushPull},
    pac::TIM5,
    timer::{self, CounterUs},
};

/// The free-running counter wraps after this long; fugit compares instants
/// across the wrap as long as they are less than half of it apart.
///
/// `Counter::start` loads ARR with one tick less than the span, so TIM5
/// actually wraps every 2^32 - 1 us while fugit assumes 2^32. An echo that
/// straddles the wrap, once every ~71 minutes, reads 1 us long.
const COUNTER_SPAN: fugit::MicrosDurationU32 = fugit::MicrosDurationU32::from_ticks(u32::MAX);

pub type TriggerPin = Pin<'B', 11, Output<PushPull>>;
pub type EchoPin = Pin<'B', 10, Input>;

/// 32-bit microsecond counter the echo interrupt timestamps against.
pub struct CounterClock {
    counter: CounterUs<TIM5>,
}

impl CounterClock {
    pub fn start(mut counter: CounterUs<TIM5>) -> Result<Self, timer::Error> {
        counter.start(COUNTER_SPAN)?;
        Ok(Self { counter })
    }
}

impl EchoClock for CounterClock {
    fn now(&mut self) -> EchoInstant {
        self.counter.now()
    }
}

pub type EchoTimer = EdgeTimer<'static, EchoPin, CounterClock>;

/// Body of the echo line's EXTI handler.
pub fn service_echo(timer: &mut EchoTimer) -> EdgeKind {
    let kind = timer.on_edge();
    timer.echo_mut().clear_interrupt_pending_bit();
    kind
}

pub type SonarSession<DELAY> = Sonar<'static, TriggerPin, DELAY>;
