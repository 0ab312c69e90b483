//! Turn evdev records into events with Quartz semantics.
//!
//! evdev reports relative pointer motion and bare key codes, while the rest of the crate expects
//! absolute locations, text and a modifier bitmask. The [`Translator`] keeps the state needed to
//! bridge the two: the held modifiers, the caps-lock toggle, the held buttons and a virtual cursor
//! that starts at the origin.

use super::codes::*;
use super::keymap;
use crate::event::{codes, EventFields};

/// Modifier keys and the flag each one holds down.
const MODIFIER_KEYS: [(u16, u64); 9] = [
    (KEY_LEFTSHIFT, codes::FLAG_MASK_SHIFT),
    (KEY_RIGHTSHIFT, codes::FLAG_MASK_SHIFT),
    (KEY_LEFTCTRL, codes::FLAG_MASK_CONTROL),
    (KEY_RIGHTCTRL, codes::FLAG_MASK_CONTROL),
    (KEY_LEFTALT, codes::FLAG_MASK_ALTERNATE),
    (KEY_RIGHTALT, codes::FLAG_MASK_ALTERNATE),
    (KEY_LEFTMETA, codes::FLAG_MASK_COMMAND),
    (KEY_RIGHTMETA, codes::FLAG_MASK_COMMAND),
    (KEY_HELP, codes::FLAG_MASK_HELP),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Left,
    Right,
    Other,
}

impl Button {
    fn from_code(code: u16) -> Option<Self> {
        match code {
            BTN_LEFT => Some(Self::Left),
            BTN_RIGHT => Some(Self::Right),
            c if (BTN_LEFT..=BTN_TASK).contains(&c) => Some(Self::Other),
            _ => None,
        }
    }

    fn event_type(self, pressed: bool) -> u32 {
        match (self, pressed) {
            (Self::Left, true) => codes::LEFT_MOUSE_DOWN,
            (Self::Left, false) => codes::LEFT_MOUSE_UP,
            (Self::Right, true) => codes::RIGHT_MOUSE_DOWN,
            (Self::Right, false) => codes::RIGHT_MOUSE_UP,
            (Self::Other, true) => codes::OTHER_MOUSE_DOWN,
            (Self::Other, false) => codes::OTHER_MOUSE_UP,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Translator {
    /// Bit `i` is set while `MODIFIER_KEYS[i]` is held.
    held_modifiers: u16,
    fn_held: bool,
    caps_lock: bool,
    left_held: bool,
    right_held: bool,
    /// Counted, several "other" buttons can be held together.
    other_held: u8,
    cursor: (f64, f64),
    pending_motion: Option<(i64, i64)>,
    pending_scroll: Option<(i64, i64)>,
}

impl Translator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one evdev record, returning the events it completes.
    pub(crate) fn translate(&mut self, type_: u16, code: u16, value: i32) -> Vec<EventFields> {
        match type_ {
            EV_KEY if (BTN_MISC..KEY_OK).contains(&code) => {
                self.button(code, value).into_iter().collect()
            }
            EV_KEY => self.key(code, value).into_iter().collect(),
            EV_REL => {
                self.relative(code, value);
                Vec::new()
            }
            EV_SYN if code == SYN_REPORT => self.flush(),
            EV_SYN if code == SYN_DROPPED => {
                self.pending_motion = None;
                self.pending_scroll = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// The Quartz flag mask for the modifiers currently held.
    pub(crate) fn flags(&self) -> u64 {
        let mut flags = MODIFIER_KEYS
            .iter()
            .enumerate()
            .filter(|(i, _)| self.held_modifiers & (1 << *i) != 0)
            .fold(0u64, |acc, (_, (_, flag))| acc | flag);

        if self.fn_held {
            flags |= codes::FLAG_MASK_SECONDARY_FN;
        }
        if self.caps_lock {
            flags |= codes::FLAG_MASK_ALPHA_SHIFT;
        }

        flags
    }

    fn key(&mut self, code: u16, value: i32) -> Option<EventFields> {
        let pressed = match value {
            EV_KEY_PRESS | EV_KEY_REPEAT => true,
            EV_KEY_RELEASE => false,
            _ => return None,
        };

        if let Some(i) = MODIFIER_KEYS.iter().position(|(key, _)| *key == code) {
            if pressed {
                self.held_modifiers |= 1 << i;
            } else {
                self.held_modifiers &= !(1 << i);
            }
            return None;
        }

        match code {
            KEY_FN => {
                self.fn_held = pressed;
                return None;
            }
            KEY_CAPSLOCK => {
                if value == EV_KEY_PRESS {
                    self.caps_lock = !self.caps_lock;
                }
                return None;
            }
            _ => {}
        }

        let mut flags = self.flags();
        if keymap::is_keypad(code) {
            flags |= codes::FLAG_MASK_NUMERIC_PAD;
        }

        let shift = flags & codes::FLAG_MASK_SHIFT != 0;
        let text = keymap::key_text(code, shift, self.caps_lock);

        Some(EventFields {
            event_type: if pressed { codes::KEY_DOWN } else { codes::KEY_UP },
            flags,
            text: text.map(|c| c.encode_utf16(&mut [0; 2]).to_vec()),
            key_code: code.into(),
            location: self.cursor,
            ..Default::default()
        })
    }

    fn button(&mut self, code: u16, value: i32) -> Option<EventFields> {
        let button = Button::from_code(code)?;
        let pressed = match value {
            EV_KEY_PRESS => true,
            EV_KEY_RELEASE => false,
            _ => return None,
        };

        match button {
            Button::Left => self.left_held = pressed,
            Button::Right => self.right_held = pressed,
            Button::Other if pressed => self.other_held = self.other_held.saturating_add(1),
            Button::Other => self.other_held = self.other_held.saturating_sub(1),
        }

        let mut event = EventFields::pointer(button.event_type(pressed), self.cursor.0, self.cursor.1);
        event.flags = self.flags();

        Some(event)
    }

    fn relative(&mut self, code: u16, value: i32) {
        let value = i64::from(value);

        match code {
            REL_X => self.pending_motion.get_or_insert((0, 0)).0 += value,
            REL_Y => self.pending_motion.get_or_insert((0, 0)).1 += value,
            REL_WHEEL => self.pending_scroll.get_or_insert((0, 0)).0 += value,
            REL_HWHEEL => self.pending_scroll.get_or_insert((0, 0)).1 += value,
            _ => {}
        }
    }

    /// Emit the motion and scrolling accumulated since the last `SYN_REPORT`.
    fn flush(&mut self) -> Vec<EventFields> {
        let mut events = Vec::new();

        if let Some((dx, dy)) = self.pending_motion.take() {
            self.cursor = (
                (self.cursor.0 + dx as f64).max(0.0),
                (self.cursor.1 + dy as f64).max(0.0),
            );

            let mut event = EventFields::pointer(self.motion_type(), self.cursor.0, self.cursor.1);
            event.flags = self.flags();
            events.push(event);
        }

        if let Some((wheel, hwheel)) = self.pending_scroll.take() {
            let mut event = EventFields::scroll(wheel, hwheel);
            event.location = self.cursor;
            event.flags = self.flags();
            events.push(event);
        }

        events
    }

    fn motion_type(&self) -> u32 {
        if self.left_held {
            codes::LEFT_MOUSE_DRAGGED
        } else if self.right_held {
            codes::RIGHT_MOUSE_DRAGGED
        } else if self.other_held > 0 {
            codes::OTHER_MOUSE_DRAGGED
        } else {
            codes::MOUSE_MOVED
        }
    }
}
