//! Render an event as one line of text.
//!
//! Every line starts with a tag naming the coarse class of the event (`Keyboard`, `Mouse` or
//! `Event`, padded to the same width) followed by the classified label.

use crate::event::{Classification, EventCategory, RawEvent};
use crate::extract::{extract_key_text, extract_location, extract_modifiers, extract_scroll};
use crate::modifiers::ModifierSet;

const KEYBOARD_TAG: &str = "Keyboard";
const MOUSE_TAG: &str = "Mouse   ";
const EVENT_TAG: &str = "Event   ";

/// Format `event`, which has already been classified as `classification`.
pub fn format_event(classification: &Classification, event: &dyn RawEvent) -> String {
    let label = &classification.label;

    match classification.category {
        EventCategory::Keyboard { .. } => format_keyboard(
            label,
            &extract_key_text(event),
            extract_modifiers(event.flags()),
        ),
        EventCategory::PointerMotion | EventCategory::PointerButton { .. } => {
            format_pointer(label, extract_location(event))
        }
        EventCategory::Scroll => format_scroll(label, extract_scroll(event)),
        EventCategory::Other | EventCategory::TapTimeout => format_other(label),
    }
}

pub fn format_keyboard(label: &str, text: &str, modifiers: ModifierSet) -> String {
    format!("[{KEYBOARD_TAG}][{label}] {text} [{modifiers}]")
}

pub fn format_pointer(label: &str, (x, y): (i64, i64)) -> String {
    format!("[{MOUSE_TAG}][{label}] x={x} y={y}")
}

pub fn format_scroll(label: &str, (dx, dy): (i64, i64)) -> String {
    format!("[{MOUSE_TAG}][{label}] dx={dx} dy={dy}")
}

pub fn format_other(label: &str) -> String {
    format!("[{EVENT_TAG}][{label}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{classify, codes, EventFields};

    fn line(event: &EventFields) -> String {
        format_event(&classify(event.event_type), event)
    }

    #[test]
    fn keyboard_line() {
        let event = EventFields::key_down("a", codes::FLAG_MASK_SHIFT);

        assert_eq!(line(&event), "[Keyboard][KeyDown          ] a [Shift]");
    }

    #[test]
    fn key_up_without_modifiers() {
        let event = EventFields::key_up("z", 0);

        assert_eq!(line(&event), "[Keyboard][KeyUp            ] z [None]");
    }

    #[test]
    fn pointer_lines() {
        let moved = EventFields::pointer(codes::MOUSE_MOVED, 100.7, 42.2);
        let clicked = EventFields::pointer(codes::RIGHT_MOUSE_DOWN, 3.0, 4.0);
        let dragged = EventFields::pointer(codes::OTHER_MOUSE_DRAGGED, 0.0, 9.99);

        assert_eq!(line(&moved), "[Mouse   ][MouseMoved       ] x=100 y=42");
        assert_eq!(line(&clicked), "[Mouse   ][RightMouseDown   ] x=3 y=4");
        assert_eq!(line(&dragged), "[Mouse   ][OtherMouseDragged] x=0 y=9");
    }

    #[test]
    fn scroll_line() {
        let event = EventFields::scroll(5, -2);

        assert_eq!(line(&event), "[Mouse   ][ScrollWheel      ] dx=-2 dy=5");
    }

    #[test]
    fn other_line_carries_raw_code() {
        let event = EventFields::new(codes::FLAGS_CHANGED);

        assert_eq!(line(&event), "[Event   ][EventType(12)]");
    }

    #[test]
    fn formatting_is_repeatable() {
        let event = EventFields::key_down("é", codes::FLAG_MASK_ALTERNATE | codes::FLAG_MASK_SHIFT);

        assert_eq!(line(&event), line(&event));
        assert_eq!(line(&event), "[Keyboard][KeyDown          ] é [Shift+Alt]");
    }
}
