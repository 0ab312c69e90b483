// Quartz event types, fields and flags (see CGEventTypes.h in the CoreGraphics framework).
//
// The Linux source translates evdev records into the same vocabulary, so everything downstream
// of a source speaks Quartz codes only.

pub const LEFT_MOUSE_DOWN: u32 = 1;
pub const LEFT_MOUSE_UP: u32 = 2;
pub const RIGHT_MOUSE_DOWN: u32 = 3;
pub const RIGHT_MOUSE_UP: u32 = 4;
pub const MOUSE_MOVED: u32 = 5;
pub const LEFT_MOUSE_DRAGGED: u32 = 6;
pub const RIGHT_MOUSE_DRAGGED: u32 = 7;
pub const KEY_DOWN: u32 = 10;
pub const KEY_UP: u32 = 11;
pub const FLAGS_CHANGED: u32 = 12;
pub const SCROLL_WHEEL: u32 = 22;
pub const OTHER_MOUSE_DOWN: u32 = 25;
pub const OTHER_MOUSE_UP: u32 = 26;
pub const OTHER_MOUSE_DRAGGED: u32 = 27;

/// Sent by the OS when it disabled the tap because a callback took too long.
pub const TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
/// Sent by the OS when the user disabled the tap (secure input and the like).
pub const TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

pub const KEYBOARD_EVENT_KEYCODE: u32 = 9;
pub const SCROLL_WHEEL_EVENT_DELTA_AXIS_1: u32 = 11;
pub const SCROLL_WHEEL_EVENT_DELTA_AXIS_2: u32 = 12;

pub const FLAG_MASK_ALPHA_SHIFT: u64 = 0x0001_0000;
pub const FLAG_MASK_SHIFT: u64 = 0x0002_0000;
pub const FLAG_MASK_CONTROL: u64 = 0x0004_0000;
pub const FLAG_MASK_ALTERNATE: u64 = 0x0008_0000;
pub const FLAG_MASK_COMMAND: u64 = 0x0010_0000;
pub const FLAG_MASK_NUMERIC_PAD: u64 = 0x0020_0000;
pub const FLAG_MASK_HELP: u64 = 0x0040_0000;
pub const FLAG_MASK_SECONDARY_FN: u64 = 0x0080_0000;

/// The event types the interception point subscribes to.
pub const INTERCEPTED_TYPES: [u32; 13] = [
    KEY_DOWN,
    KEY_UP,
    MOUSE_MOVED,
    LEFT_MOUSE_DOWN,
    LEFT_MOUSE_UP,
    RIGHT_MOUSE_DOWN,
    RIGHT_MOUSE_UP,
    OTHER_MOUSE_DOWN,
    OTHER_MOUSE_UP,
    LEFT_MOUSE_DRAGGED,
    RIGHT_MOUSE_DRAGGED,
    OTHER_MOUSE_DRAGGED,
    SCROLL_WHEEL,
];

/// Build the `CGEventMask` for [`INTERCEPTED_TYPES`].
pub const fn interception_mask() -> u64 {
    let mut mask = 0;
    let mut i = 0;

    while i < INTERCEPTED_TYPES.len() {
        mask |= 1 << INTERCEPTED_TYPES[i];
        i += 1;
    }

    mask
}
