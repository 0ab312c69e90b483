//! Pull the printable fields out of a [`RawEvent`].
//!
//! None of these functions fail. A field the platform cannot decode degrades to a fallback value.

use crate::event::RawEvent;
use crate::modifiers::ModifierSet;

/// The maximum number of UTF-16 code units read from a key event.
pub const MAX_KEY_TEXT_UNITS: usize = 4;

/// The text produced by a key event, or `<keycode N>` if there is none.
pub fn extract_key_text(event: &dyn RawEvent) -> String {
    let decoded = event.unicode_units(MAX_KEY_TEXT_UNITS).and_then(|mut units| {
        units.truncate(MAX_KEY_TEXT_UNITS);
        String::from_utf16(&units).ok()
    });

    match decoded {
        Some(text) if !text.is_empty() => text,
        _ => format!("<keycode {}>", event.key_code()),
    }
}

pub fn extract_modifiers(flags: u64) -> ModifierSet {
    ModifierSet::from_flags(flags)
}

/// The pointer location, truncated toward zero.
pub fn extract_location(event: &dyn RawEvent) -> (i64, i64) {
    let (x, y) = event.location();

    (x.trunc() as i64, y.trunc() as i64)
}

/// The scroll deltas as `(dx, dy)`.
pub fn extract_scroll(event: &dyn RawEvent) -> (i64, i64) {
    let (axis1, axis2) = event.scroll_axes();

    (axis2, axis1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{codes, EventFields};

    #[test]
    fn key_text_is_decoded() {
        let event = EventFields::key_down("a", 0);

        assert_eq!(extract_key_text(&event), "a");
    }

    #[test]
    fn key_text_is_capped_at_four_units() {
        let event = EventFields::key_down("abcdefg", 0);

        assert_eq!(extract_key_text(&event), "abcd");
    }

    #[test]
    fn empty_text_falls_back_to_key_code() {
        let event = EventFields::key(codes::KEY_DOWN, "", 122, 0);

        assert_eq!(extract_key_text(&event), "<keycode 122>");
    }

    #[test]
    fn missing_text_falls_back_to_key_code() {
        let mut event = EventFields::new(codes::KEY_UP);
        event.key_code = 53;

        assert_eq!(extract_key_text(&event), "<keycode 53>");
    }

    #[test]
    fn invalid_utf16_falls_back_to_key_code() {
        let mut event = EventFields::new(codes::KEY_DOWN);
        // A lone high surrogate.
        event.text = Some(vec![0xD800]);
        event.key_code = 7;

        assert_eq!(extract_key_text(&event), "<keycode 7>");
    }

    #[test]
    fn location_truncates_toward_zero() {
        let event = EventFields::pointer(codes::MOUSE_MOVED, 100.7, 42.2);
        assert_eq!(extract_location(&event), (100, 42));

        let event = EventFields::pointer(codes::MOUSE_MOVED, -3.9, -0.5);
        assert_eq!(extract_location(&event), (-3, 0));
    }

    #[test]
    fn scroll_axes_map_to_dy_and_dx() {
        let event = EventFields::scroll(5, -2);

        assert_eq!(extract_scroll(&event), (-2, 5));
    }

    #[test]
    fn modifiers_from_flags() {
        assert_eq!(extract_modifiers(0).to_string(), "None");
        assert_eq!(
            extract_modifiers(codes::FLAG_MASK_SHIFT | codes::FLAG_MASK_ALTERNATE).to_string(),
            "Shift+Alt"
        );
    }
}
