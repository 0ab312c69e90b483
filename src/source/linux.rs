//! Interception through the evdev character devices under `/dev/input`.
//!
//! evdev has no way to withhold a single event from the rest of the system. With a suppressing
//! policy every device is grabbed exclusively once none of its keys is held, so nothing reaches
//! the display server; otherwise nothing is grabbed and a "suppress" answer (the kill key) cannot
//! be enforced. The devices never time out, so no re-enable is ever requested.

mod codes;
mod device;
mod keymap;
mod translate;

use std::io;
use std::time::{Duration, Instant};

use futures::future;
use tokio::runtime::{self, Runtime};
use tracing::{debug, info, trace, warn};

use crate::callback::{Decision, EventHandler, SuppressionPolicy, TapControl};
use crate::driver::EventSource;
use crate::event::EventFields;
use crate::HidLoggerResult;

use device::InputDevice;
use translate::Translator;

/// How long to wait for keys held at startup (usually the Enter that started the program) before
/// grabbing anyway.
const RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// Keyboards and mice read through evdev.
pub struct EvdevSource {
    runtime: Runtime,
    devices: Vec<InputDevice>,
    translator: Translator,
    handler: Box<dyn EventHandler>,
    grabbed: bool,
}

/// evdev devices cannot be disabled by the kernel the way an event tap can.
struct EvdevTap;

impl TapControl for EvdevTap {
    fn reenable(&self) {
        debug!("evdev devices are never disabled, nothing to re-enable");
    }
}

impl EvdevSource {
    /// Open every keyboard and mouse, grabbing them if `policy` suppresses events.
    pub fn new(policy: SuppressionPolicy, handler: Box<dyn EventHandler>) -> HidLoggerResult<Self> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()?;

        let devices = {
            let _guard = runtime.enter();
            device::find_input_devices()?
        };

        let grabbed = policy.is_suppressing();
        for device in &devices {
            if grabbed {
                runtime.block_on(device.wait_for_release(RELEASE_TIMEOUT))?;
                device.grab()?;
            }
            info!("reading {} ({})", device.name(), device.path().display());
        }

        Ok(Self {
            runtime,
            devices,
            translator: Translator::new(),
            handler,
            grabbed,
        })
    }

    fn dispatch(&mut self, event: &EventFields) {
        let decision = self.handler.handle_event(event, &EvdevTap);

        if decision == Decision::Suppress && !self.grabbed {
            trace!("cannot withhold event type {} from ungrabbed devices", event.event_type);
        }
    }
}

impl EventSource for EvdevSource {
    fn pump(&mut self, slice: Duration) -> HidLoggerResult<()> {
        let deadline = Instant::now() + slice;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }

            let Some((index, result)) = self
                .runtime
                .block_on(next_batch(&self.devices, remaining))
            else {
                return Ok(());
            };

            match result {
                Ok(records) => {
                    for record in &records {
                        let events =
                            self.translator
                                .translate(record.type_, record.code, record.value);

                        for event in &events {
                            self.dispatch(event);
                        }
                    }
                }
                Err(e) => {
                    let device = self.devices.remove(index);
                    warn!(
                        "dropping {} ({}): {e}",
                        device.name(),
                        device.path().display()
                    );
                }
            }
        }
    }
}

/// Wait at most `timeout` for any device to have input, returning its index and what was read.
async fn next_batch(
    devices: &[InputDevice],
    timeout: Duration,
) -> Option<(usize, io::Result<Vec<libc::input_event>>)> {
    if devices.is_empty() {
        tokio::time::sleep(timeout).await;
        return None;
    }

    let reads = devices.iter().map(InputDevice::read_input_events);

    match tokio::time::timeout(timeout, future::select_all(reads)).await {
        Ok((result, index, _pending)) => Some((index, result)),
        Err(_elapsed) => None,
    }
}
