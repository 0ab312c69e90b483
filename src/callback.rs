use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::event::{classify, EventCategory, RawEvent};
use crate::extract::{extract_key_text, extract_modifiers};
use crate::format::{format_event, format_keyboard};
use crate::kill_switch::KillSwitch;

/// Printed when the kill key is pressed.
pub const KILL_MESSAGE: &str = "\nKill-switch activated: 'q' pressed. Stopping logger.";

/// What the event source should do with an event once the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Pass the event on unchanged.
    Forward,
    /// Drop the event; it never reaches its destination.
    Suppress,
}

/// Whether events are kept from reaching the OS. Fixed for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuppressionPolicy {
    #[default]
    Forward,
    Suppress,
}

impl SuppressionPolicy {
    /// The policy selected by the `--catch` flag.
    pub fn from_catch(catch: bool) -> Self {
        if catch {
            Self::Suppress
        } else {
            Self::Forward
        }
    }

    pub fn is_suppressing(self) -> bool {
        self == Self::Suppress
    }

    /// The decision for an event with no override.
    pub fn decision(self) -> Decision {
        match self {
            Self::Forward => Decision::Forward,
            Self::Suppress => Decision::Suppress,
        }
    }
}

/// Control over the interception point that delivered an event.
pub trait TapControl {
    /// Turn the interception point back on after the OS disabled it.
    fn reenable(&self);
}

/// Receives every intercepted event and decides its fate.
pub trait EventHandler {
    /// Handle one event. Must not block and must not panic.
    fn handle_event(&mut self, event: &dyn RawEvent, tap: &dyn TapControl) -> Decision;
}

/// The event handler that logs each event as a line of text.
pub struct EventCallback<W: Write = io::Stdout> {
    policy: SuppressionPolicy,
    kill_switch: Arc<KillSwitch>,
    out: W,
}

impl EventCallback<io::Stdout> {
    /// A callback printing to stdout.
    pub fn stdout(policy: SuppressionPolicy, kill_switch: Arc<KillSwitch>) -> Self {
        Self::new(policy, kill_switch, io::stdout())
    }
}

impl<W: Write> EventCallback<W> {
    pub fn new(policy: SuppressionPolicy, kill_switch: Arc<KillSwitch>, out: W) -> Self {
        Self {
            policy,
            kill_switch,
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        let res = writeln!(self.out, "{line}").and_then(|_| self.out.flush());

        // A closed stdout must not take the event tap down with it
        if let Err(e) = res {
            debug!("failed to write event line: {e}");
        }
    }
}

impl<W: Write> EventHandler for EventCallback<W> {
    fn handle_event(&mut self, event: &dyn RawEvent, tap: &dyn TapControl) -> Decision {
        let classification = classify(event.event_type());

        let line = match classification.category {
            EventCategory::TapTimeout => {
                warn!("event tap disabled by timeout, re-enabling");
                tap.reenable();

                return Decision::Forward;
            }
            EventCategory::Keyboard { pressed } => {
                let key_text = extract_key_text(event);

                if pressed && KillSwitch::is_kill_key(&key_text) {
                    if self.kill_switch.trigger() {
                        debug!("kill switch triggered");
                    }
                    self.emit(KILL_MESSAGE);

                    return Decision::Suppress;
                }

                format_keyboard(
                    &classification.label,
                    &key_text,
                    extract_modifiers(event.flags()),
                )
            }
            _ => format_event(&classification, event),
        };

        self.emit(&line);

        let decision = self.policy.decision();
        trace!(label = classification.label.trim_end(), ?decision, "handled event");

        decision
    }
}
