// Some interesting event types and codes (see [input-event-codes.h] and the [kernel docs]).
//
// [input-event-codes.h]: https://elixir.bootlin.com/linux/v5.19.17/source/include/uapi/linux/input-event-codes.h
// [kernel docs]: https://www.kernel.org/doc/html/latest/input/event-codes.html
pub(crate) const EV_SYN: u16 = 0x00;
pub(crate) const EV_KEY: u16 = 0x01;
pub(crate) const EV_REL: u16 = 0x02;
pub(crate) const EV_ABS: u16 = 0x03;
pub(crate) const EV_MSC: u16 = 0x04;
pub(crate) const EV_REP: u16 = 0x14;

pub(crate) const SYN_REPORT: u16 = 0;
pub(crate) const SYN_DROPPED: u16 = 3;

pub(crate) const REL_X: u16 = 0x00;
pub(crate) const REL_Y: u16 = 0x01;
pub(crate) const REL_HWHEEL: u16 = 0x06;
pub(crate) const REL_WHEEL: u16 = 0x08;

/// The `value` of an EV_KEY caused by a key being released.
pub(crate) const EV_KEY_RELEASE: i32 = 0;
/// The `value` of an EV_KEY caused by a key press.
pub(crate) const EV_KEY_PRESS: i32 = 1;
/// The `value` of an EV_KEY caused by a key being held down.
pub(crate) const EV_KEY_REPEAT: i32 = 2;

pub(crate) const KEY_LEFTCTRL: u16 = 29;
pub(crate) const KEY_LEFTSHIFT: u16 = 42;
pub(crate) const KEY_RIGHTSHIFT: u16 = 54;
pub(crate) const KEY_LEFTALT: u16 = 56;
pub(crate) const KEY_CAPSLOCK: u16 = 58;
pub(crate) const KEY_RIGHTCTRL: u16 = 97;
pub(crate) const KEY_RIGHTALT: u16 = 100;
pub(crate) const KEY_LEFTMETA: u16 = 125;
pub(crate) const KEY_RIGHTMETA: u16 = 126;
pub(crate) const KEY_HELP: u16 = 138;
pub(crate) const KEY_FN: u16 = 0x1d0;

pub(crate) const BTN_MISC: u16 = 0x100;
pub(crate) const BTN_LEFT: u16 = 0x110;
pub(crate) const BTN_RIGHT: u16 = 0x111;
pub(crate) const BTN_TASK: u16 = 0x117;
/// The first key code after the button range.
pub(crate) const KEY_OK: u16 = 0x160;
pub(crate) const KEY_MAX: u16 = 0x2ff;
