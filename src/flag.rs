use core::cell::Cell;

use critical_section::Mutex;
use fugit::MicrosDurationU32;

use crate::edge::{EchoInstant, EdgeKind};

/// Externally visible state of a ranging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangingState {
    /// No cycle in flight, echo edges are noise.
    Unarmed,
    /// Trigger issued, waiting for the echo pulse.
    Armed,
    /// Both edges of the echo pulse have been captured.
    Complete,
}

/// Rising-to-falling interval of the most recent echo pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoWindow {
    pub start: EchoInstant,
    pub stop: EchoInstant,
}

impl EchoWindow {
    /// Pulse width, or `None` if `stop` precedes `start`.
    pub fn width(&self) -> Option<MicrosDurationU32> {
        self.stop.checked_duration_since(self.start)
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Unarmed,
    Armed { start: Option<EchoInstant> },
    Complete(EchoWindow),
}

impl Phase {
    fn state(&self) -> RangingState {
        match self {
            Phase::Unarmed => RangingState::Unarmed,
            Phase::Armed { .. } => RangingState::Armed,
            Phase::Complete(_) => RangingState::Complete,
        }
    }
}

/// Hand-off point between the echo interrupt and the polling caller.
///
/// The cycle state and the captured timestamps live in one value, and every
/// read or transition happens inside a single critical section. Observing
/// [`RangingState::Complete`] therefore always comes with the matching stop
/// timestamp.
///
/// The caller owns `Unarmed -> Armed` and the return to `Unarmed`, the edge
/// handler owns `Armed -> Complete`. Only one session may drive a flag at a
/// time; it holds a [`FlagClaim`] for as long as it lives.
pub struct RangingFlag {
    phase: Mutex<Cell<Phase>>,
    claimed: Mutex<Cell<bool>>,
}

impl RangingFlag {
    pub const fn new() -> Self {
        Self {
            phase: Mutex::new(Cell::new(Phase::Unarmed)),
            claimed: Mutex::new(Cell::new(false)),
        }
    }

    pub fn state(&self) -> RangingState {
        critical_section::with(|cs| self.phase.borrow(cs).get().state())
    }

    /// Non-blocking check, cheap enough for a busy-poll.
    pub fn is_complete(&self) -> bool {
        self.state() == RangingState::Complete
    }

    /// The captured window, once the cycle is complete.
    pub fn window(&self) -> Option<EchoWindow> {
        critical_section::with(|cs| match self.phase.borrow(cs).get() {
            Phase::Complete(window) => Some(window),
            _ => None,
        })
    }

    /// Opens a new cycle. Refuses to skip a state: on failure the state that
    /// blocked arming is returned and nothing changes.
    pub fn arm(&self) -> Result<(), RangingState> {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            match phase.get() {
                Phase::Unarmed => {
                    phase.set(Phase::Armed { start: None });
                    Ok(())
                }
                other => Err(other.state()),
            }
        })
    }

    /// Back to `Unarmed`, dropping whatever was captured. Idempotent.
    pub fn reset(&self) {
        critical_section::with(|cs| self.phase.borrow(cs).set(Phase::Unarmed));
    }

    /// Takes exclusive use of the flag, or `None` if another session holds it.
    pub fn claim(&self) -> Option<FlagClaim<'_>> {
        let taken = critical_section::with(|cs| self.claimed.borrow(cs).replace(true));
        if taken {
            None
        } else {
            Some(FlagClaim { flag: self })
        }
    }

    pub fn is_claimed(&self) -> bool {
        critical_section::with(|cs| self.claimed.borrow(cs).get())
    }

    /// Classifies one echo edge and records it, all in one critical section.
    ///
    /// `level_high` is the pin level sampled after the edge.
    pub(crate) fn latch(&self, level_high: bool, at: EchoInstant) -> EdgeKind {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            match (phase.get(), level_high) {
                (Phase::Armed { .. }, true) => {
                    phase.set(Phase::Armed { start: Some(at) });
                    EdgeKind::Start
                }
                (Phase::Armed { start: Some(start) }, false) => {
                    phase.set(Phase::Complete(EchoWindow { start, stop: at }));
                    EdgeKind::Stop
                }
                _ => EdgeKind::Ignored,
            }
        })
    }
}

/// Exclusive use of a [`RangingFlag`], given back on drop.
pub struct FlagClaim<'a> {
    flag: &'a RangingFlag,
}

impl<'a> FlagClaim<'a> {
    pub fn flag(&self) -> &'a RangingFlag {
        self.flag
    }
}

impl Drop for FlagClaim<'_> {
    fn drop(&mut self) {
        critical_section::with(|cs| self.flag.claimed.borrow(cs).set(false));
    }
}

impl Default for RangingFlag {
    fn default() -> Self {
        Self::new()
    }
}
