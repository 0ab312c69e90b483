//! This crate intercepts the keyboard and mouse events delivered by the operating system's input
//! pipeline, prints one human-readable line per event and optionally keeps the events from
//! reaching their destination.
//!
//! The pipeline is platform independent: an [`EventSource`] delivers events one at a time to an
//! [`EventHandler`] (normally an [`EventCallback`]), which classifies the event, extracts its
//! fields, prints it and answers with a [`Decision`]. The [`driver::run`] loop pumps the source
//! until the [`KillSwitch`] fires (the `q` key) or the process is interrupted.
//!
//! # Example
//!
//! Log every event without suppressing anything. On macOS the process needs the Accessibility
//! permission, on Linux read access to `/dev/input`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hid_logger::{driver, open_default_source, EventCallback, Interrupt, KillSwitch};
//! use hid_logger::{HidLoggerError, SuppressionPolicy};
//!
//! fn main() -> Result<(), HidLoggerError> {
//!     let kill_switch = Arc::new(KillSwitch::new());
//!     let policy = SuppressionPolicy::Forward;
//!     let callback = EventCallback::stdout(policy, Arc::clone(&kill_switch));
//!
//!     let mut source = open_default_source(policy, Box::new(callback))?;
//!     let reason = driver::run(&mut source, &kill_switch, &Interrupt::new(), driver::PUMP_INTERVAL);
//!
//!     println!("stopped: {reason:?}");
//!     Ok(())
//! }
//! ```

mod error;

pub mod callback;
pub mod cli;
pub mod driver;
pub mod event;
pub mod extract;
pub mod format;
pub mod kill_switch;
pub mod modifiers;
pub mod source;

pub use callback::{Decision, EventCallback, EventHandler, SuppressionPolicy, TapControl};
pub use driver::{EventSource, Interrupt, StopReason};
pub use error::HidLoggerError;
pub use event::{classify, Classification, EventCategory, EventFields, MouseButton, RawEvent};
pub use kill_switch::KillSwitch;
pub use modifiers::ModifierSet;
pub use source::open_default_source;

pub type HidLoggerResult<T> = Result<T, HidLoggerError>;
