use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::kill_switch::KillSwitch;
use crate::HidLoggerResult;

/// How long the event source is pumped between two checks of the stop conditions.
pub const PUMP_INTERVAL: Duration = Duration::from_millis(250);

/// A source of intercepted events.
///
/// The source owns the [`EventHandler`](crate::EventHandler) and calls it synchronously for each
/// event while it is being pumped.
pub trait EventSource {
    /// Deliver events to the handler for at most `slice`.
    fn pump(&mut self, slice: Duration) -> HidLoggerResult<()>;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn pump(&mut self, slice: Duration) -> HidLoggerResult<()> {
        (**self).pump(slice)
    }
}

/// Set when the process receives an interrupt signal.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag from the SIGINT/SIGTERM/SIGHUP handler.
    pub fn install_handler(&self) -> Result<(), ctrlc::Error> {
        let interrupt = self.clone();

        ctrlc::set_handler(move || interrupt.raise())
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why the driver loop returned. Both are clean stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The kill key was pressed.
    KillSwitch,
    /// The process was interrupted.
    Interrupted,
}

/// Pump `source` until the kill switch fires or the process is interrupted.
///
/// The stop conditions are only checked between two pumps, so an event being handled always
/// runs to completion.
pub fn run<S: EventSource + ?Sized>(
    source: &mut S,
    kill_switch: &KillSwitch,
    interrupt: &Interrupt,
    slice: Duration,
) -> StopReason {
    info!("driving event source every {slice:?}");

    loop {
        if let Err(e) = source.pump(slice) {
            warn!("event source failed: {e}");
            // Keep the loop from spinning on a persistent failure
            thread::sleep(slice);
        }

        if kill_switch.is_triggered() {
            debug!("kill switch observed, stopping");
            return StopReason::KillSwitch;
        }

        if interrupt.is_raised() {
            debug!("interrupt observed, stopping");
            return StopReason::Interrupted;
        }
    }
}
