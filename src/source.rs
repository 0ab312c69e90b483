//! The platform interception points.

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "macos")]
pub mod macos;

use crate::callback::{EventHandler, SuppressionPolicy};
use crate::driver::EventSource;
use crate::HidLoggerResult;

/// Install the interception point of the current platform, delivering events to `handler`.
#[cfg(target_os = "macos")]
pub fn open_default_source(
    _policy: SuppressionPolicy,
    handler: Box<dyn EventHandler>,
) -> HidLoggerResult<Box<dyn EventSource>> {
    Ok(Box::new(macos::QuartzEventTap::new(handler)?))
}

/// Install the interception point of the current platform, delivering events to `handler`.
#[cfg(target_os = "linux")]
pub fn open_default_source(
    policy: SuppressionPolicy,
    handler: Box<dyn EventHandler>,
) -> HidLoggerResult<Box<dyn EventSource>> {
    Ok(Box::new(linux::EvdevSource::new(policy, handler)?))
}

/// Install the interception point of the current platform, delivering events to `handler`.
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn open_default_source(
    _policy: SuppressionPolicy,
    _handler: Box<dyn EventHandler>,
) -> HidLoggerResult<Box<dyn EventSource>> {
    Err(crate::HidLoggerError::UnsupportedPlatform)
}
