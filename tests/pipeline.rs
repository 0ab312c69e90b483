use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use hid_logger::callback::KILL_MESSAGE;
use hid_logger::event::codes;
use hid_logger::{
    driver, Decision, EventCallback, EventFields, EventHandler, EventSource, HidLoggerResult,
    Interrupt, KillSwitch, StopReason, SuppressionPolicy, TapControl,
};

#[derive(Default)]
struct RecordingTap {
    reenabled: Cell<usize>,
}

impl TapControl for RecordingTap {
    fn reenable(&self) {
        self.reenabled.set(self.reenabled.get() + 1);
    }
}

/// Delivers one batch of events per pump, then raises the interrupt once it runs dry.
struct ScriptedSource {
    batches: VecDeque<Vec<EventFields>>,
    callback: EventCallback<Vec<u8>>,
    tap: RecordingTap,
    decisions: Vec<Decision>,
    pumps: usize,
    interrupt: Interrupt,
}

impl ScriptedSource {
    fn new(
        policy: SuppressionPolicy,
        kill_switch: &Arc<KillSwitch>,
        interrupt: &Interrupt,
        batches: Vec<Vec<EventFields>>,
    ) -> Self {
        Self {
            batches: batches.into(),
            callback: EventCallback::new(policy, Arc::clone(kill_switch), Vec::new()),
            tap: RecordingTap::default(),
            decisions: Vec::new(),
            pumps: 0,
            interrupt: interrupt.clone(),
        }
    }

    fn printed(&self) -> String {
        String::from_utf8(self.callback.output().clone()).unwrap()
    }
}

impl EventSource for ScriptedSource {
    fn pump(&mut self, _slice: Duration) -> HidLoggerResult<()> {
        self.pumps += 1;

        let Some(batch) = self.batches.pop_front() else {
            self.interrupt.raise();
            return Ok(());
        };

        for event in &batch {
            let decision = self.callback.handle_event(event, &self.tap);
            self.decisions.push(decision);
        }

        Ok(())
    }
}

#[test]
fn logs_forwards_and_stops_on_kill_key() {
    let kill_switch = Arc::new(KillSwitch::new());
    let interrupt = Interrupt::new();
    let mut source = ScriptedSource::new(
        SuppressionPolicy::Forward,
        &kill_switch,
        &interrupt,
        vec![
            vec![
                EventFields::key_down("a", codes::FLAG_MASK_SHIFT),
                EventFields::scroll(5, -2),
            ],
            vec![EventFields::pointer(codes::MOUSE_MOVED, 100.7, 42.2)],
            vec![EventFields::key_down("q", 0)],
            vec![EventFields::key_down("never", 0)],
        ],
    );

    let reason = driver::run(&mut source, &kill_switch, &interrupt, Duration::ZERO);

    assert_eq!(reason, StopReason::KillSwitch);
    assert_eq!(source.pumps, 3);
    assert_eq!(
        source.decisions,
        [
            Decision::Forward,
            Decision::Forward,
            Decision::Forward,
            Decision::Suppress
        ]
    );
    assert_eq!(
        source.printed(),
        format!(
            "[Keyboard][KeyDown          ] a [Shift]\n\
             [Mouse   ][ScrollWheel      ] dx=-2 dy=5\n\
             [Mouse   ][MouseMoved       ] x=100 y=42\n\
             {KILL_MESSAGE}\n"
        )
    );
}

#[test]
fn catch_mode_suppresses_everything_but_timeouts() {
    let kill_switch = Arc::new(KillSwitch::new());
    let interrupt = Interrupt::new();
    let mut source = ScriptedSource::new(
        SuppressionPolicy::Suppress,
        &kill_switch,
        &interrupt,
        vec![vec![
            EventFields::pointer(codes::LEFT_MOUSE_DOWN, 1.0, 2.0),
            EventFields::tap_timeout(),
            EventFields::key_up("x", codes::FLAG_MASK_COMMAND),
            EventFields::new(codes::FLAGS_CHANGED),
        ]],
    );

    let reason = driver::run(&mut source, &kill_switch, &interrupt, Duration::ZERO);

    assert_eq!(reason, StopReason::Interrupted);
    assert!(!kill_switch.is_triggered());
    assert_eq!(source.tap.reenabled.get(), 1);
    assert_eq!(
        source.decisions,
        [
            Decision::Suppress,
            Decision::Forward,
            Decision::Suppress,
            Decision::Suppress
        ]
    );
    assert_eq!(
        source.printed(),
        "[Mouse   ][LeftMouseDown    ] x=1 y=2\n\
         [Keyboard][KeyUp            ] x [Cmd]\n\
         [Event   ][EventType(12)]\n"
    );
}

#[test]
fn interrupt_stops_a_quiet_session() {
    let kill_switch = Arc::new(KillSwitch::new());
    let interrupt = Interrupt::new();
    let mut source = ScriptedSource::new(
        SuppressionPolicy::Forward,
        &kill_switch,
        &interrupt,
        Vec::new(),
    );

    let reason = driver::run(&mut source, &kill_switch, &interrupt, Duration::ZERO);

    assert_eq!(reason, StopReason::Interrupted);
    assert_eq!(source.pumps, 1);
    assert!(source.printed().is_empty());
}
