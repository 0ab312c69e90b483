pub mod codes;

use std::borrow::Cow;

/// Read-only access to the fields of one intercepted event.
///
/// Implementations borrow the platform's event handle, which is only valid for the duration of a
/// single callback invocation, so a `RawEvent` must never be retained past the call it was handed
/// to.
pub trait RawEvent {
    /// The Quartz event type code.
    fn event_type(&self) -> u32;

    /// The modifier-flag bitmask (Quartz `CGEventFlags`).
    fn flags(&self) -> u64;

    /// At most `max_units` UTF-16 code units of the text produced by a key event.
    ///
    /// Returns `None` if the platform could not produce any text for the event.
    fn unicode_units(&self, max_units: usize) -> Option<Vec<u16>>;

    /// The hardware-dependent key code of a key event.
    fn key_code(&self) -> i64;

    /// The pointer location in global display coordinates.
    fn location(&self) -> (f64, f64);

    /// The scroll deltas as `(axis 1, axis 2)`, i.e. `(vertical, horizontal)`.
    fn scroll_axes(&self) -> (i64, i64);
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Other,
}

/// The coarse kind of an event, derived from its type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    /// A key was pressed (or auto-repeated) or released.
    Keyboard { pressed: bool },
    /// The pointer moved, with or without a button held.
    PointerMotion,
    /// A mouse button was pressed or released.
    PointerButton { button: MouseButton, pressed: bool },
    /// The scroll wheel moved.
    Scroll,
    /// An event type this crate has no special handling for.
    Other,
    /// The OS disabled the interception point because the callback was too slow.
    TapTimeout,
}

/// The category of an event together with the label it is printed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: EventCategory,
    pub label: Cow<'static, str>,
}

/// Width of every known label, so that printed columns line up.
pub const LABEL_WIDTH: usize = 17;

static KNOWN_TYPES: [(u32, &str, EventCategory); 13] = [
    (codes::KEY_DOWN, "KeyDown          ", EventCategory::Keyboard { pressed: true }),
    (codes::KEY_UP, "KeyUp            ", EventCategory::Keyboard { pressed: false }),
    (codes::MOUSE_MOVED, "MouseMoved       ", EventCategory::PointerMotion),
    (
        codes::LEFT_MOUSE_DOWN,
        "LeftMouseDown    ",
        EventCategory::PointerButton { button: MouseButton::Left, pressed: true },
    ),
    (
        codes::LEFT_MOUSE_UP,
        "LeftMouseUp      ",
        EventCategory::PointerButton { button: MouseButton::Left, pressed: false },
    ),
    (
        codes::RIGHT_MOUSE_DOWN,
        "RightMouseDown   ",
        EventCategory::PointerButton { button: MouseButton::Right, pressed: true },
    ),
    (
        codes::RIGHT_MOUSE_UP,
        "RightMouseUp     ",
        EventCategory::PointerButton { button: MouseButton::Right, pressed: false },
    ),
    (
        codes::OTHER_MOUSE_DOWN,
        "OtherMouseDown   ",
        EventCategory::PointerButton { button: MouseButton::Other, pressed: true },
    ),
    (
        codes::OTHER_MOUSE_UP,
        "OtherMouseUp     ",
        EventCategory::PointerButton { button: MouseButton::Other, pressed: false },
    ),
    (codes::SCROLL_WHEEL, "ScrollWheel      ", EventCategory::Scroll),
    (codes::LEFT_MOUSE_DRAGGED, "LeftMouseDragged ", EventCategory::PointerMotion),
    (codes::RIGHT_MOUSE_DRAGGED, "RightMouseDragged", EventCategory::PointerMotion),
    (codes::OTHER_MOUSE_DRAGGED, "OtherMouseDragged", EventCategory::PointerMotion),
];

/// Classify an event type code.
///
/// This never fails: codes without a fixed label are reported as `EventType(<code>)`.
pub fn classify(event_type: u32) -> Classification {
    if let Some((_, label, category)) = KNOWN_TYPES.iter().find(|(code, ..)| *code == event_type) {
        return Classification {
            category: *category,
            label: Cow::Borrowed(*label),
        };
    }

    let category = if event_type == codes::TAP_DISABLED_BY_TIMEOUT {
        EventCategory::TapTimeout
    } else {
        EventCategory::Other
    };

    Classification {
        category,
        label: Cow::Owned(format!("EventType({event_type})")),
    }
}

/// An owned copy of the fields of an event.
///
/// Used by sources that build events themselves rather than borrowing a platform handle, and for
/// synthesizing events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFields {
    pub event_type: u32,
    pub flags: u64,
    pub text: Option<Vec<u16>>,
    pub key_code: i64,
    pub location: (f64, f64),
    pub scroll: (i64, i64),
}

impl EventFields {
    pub fn new(event_type: u32) -> Self {
        Self {
            event_type,
            ..Default::default()
        }
    }

    /// A key event producing `text`.
    pub fn key(event_type: u32, text: &str, key_code: i64, flags: u64) -> Self {
        Self {
            event_type,
            flags,
            text: Some(text.encode_utf16().collect()),
            key_code,
            ..Default::default()
        }
    }

    pub fn key_down(text: &str, flags: u64) -> Self {
        Self::key(codes::KEY_DOWN, text, 0, flags)
    }

    pub fn key_up(text: &str, flags: u64) -> Self {
        Self::key(codes::KEY_UP, text, 0, flags)
    }

    /// A motion or button event at `(x, y)`.
    pub fn pointer(event_type: u32, x: f64, y: f64) -> Self {
        Self {
            event_type,
            location: (x, y),
            ..Default::default()
        }
    }

    pub fn scroll(axis1: i64, axis2: i64) -> Self {
        Self {
            event_type: codes::SCROLL_WHEEL,
            scroll: (axis1, axis2),
            ..Default::default()
        }
    }

    pub fn tap_timeout() -> Self {
        Self::new(codes::TAP_DISABLED_BY_TIMEOUT)
    }
}

impl RawEvent for EventFields {
    fn event_type(&self) -> u32 {
        self.event_type
    }

    fn flags(&self) -> u64 {
        self.flags
    }

    fn unicode_units(&self, max_units: usize) -> Option<Vec<u16>> {
        self.text
            .as_ref()
            .map(|units| units.iter().take(max_units).copied().collect())
    }

    fn key_code(&self) -> i64 {
        self.key_code
    }

    fn location(&self) -> (f64, f64) {
        self.location
    }

    fn scroll_axes(&self) -> (i64, i64) {
        self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_fixed_labels() {
        let expected = [
            (1, "LeftMouseDown    "),
            (2, "LeftMouseUp      "),
            (3, "RightMouseDown   "),
            (4, "RightMouseUp     "),
            (5, "MouseMoved       "),
            (6, "LeftMouseDragged "),
            (7, "RightMouseDragged"),
            (10, "KeyDown          "),
            (11, "KeyUp            "),
            (22, "ScrollWheel      "),
            (25, "OtherMouseDown   "),
            (26, "OtherMouseUp     "),
            (27, "OtherMouseDragged"),
        ];

        for (code, label) in expected {
            assert_eq!(classify(code).label, label, "code {code}");
            assert_eq!(classify(code).label.len(), LABEL_WIDTH);
        }
    }

    #[test]
    fn unknown_codes_embed_the_code() {
        for code in [0, 8, 12, 21, 28, 1000, u32::MAX] {
            let classification = classify(code);

            assert_eq!(classification.category, EventCategory::Other);
            assert_eq!(classification.label, format!("EventType({code})"));
        }
    }

    #[test]
    fn timeout_sentinel_is_its_own_category() {
        let classification = classify(codes::TAP_DISABLED_BY_TIMEOUT);

        assert_eq!(classification.category, EventCategory::TapTimeout);
        assert_eq!(classification.label, "EventType(4294967294)");
    }

    #[test]
    fn categories_of_known_codes() {
        assert_eq!(classify(10).category, EventCategory::Keyboard { pressed: true });
        assert_eq!(classify(11).category, EventCategory::Keyboard { pressed: false });
        assert_eq!(classify(7).category, EventCategory::PointerMotion);
        assert_eq!(
            classify(25).category,
            EventCategory::PointerButton {
                button: MouseButton::Other,
                pressed: true
            }
        );
        assert_eq!(classify(22).category, EventCategory::Scroll);
    }

    #[test]
    fn mask_covers_exactly_the_intercepted_types() {
        let mask = codes::interception_mask();

        assert_eq!(mask.count_ones(), 13);
        assert_ne!(mask & (1 << codes::KEY_DOWN), 0);
        assert_eq!(mask & (1 << codes::FLAGS_CHANGED), 0);
    }

    #[test]
    fn snapshot_caps_text_units() {
        let event = EventFields::key_down("abcdef", 0);

        assert_eq!(event.unicode_units(4), Some("abcd".encode_utf16().collect()));
    }
}
