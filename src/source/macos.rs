//! Interception through a Quartz event tap.
//!
//! The tap sits at the HID level, at the head of the event stream, and is an active (not
//! listen-only) tap so that returning `NULL` from the callback withholds an event from the OS.
//! The process needs the Accessibility permission for the tap to be created.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::thread;
use std::time::Duration;

use core_foundation::base::{CFRelease, CFTypeRef};
use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode};
use tracing::{error, info, warn};

use crate::callback::{Decision, EventHandler, TapControl};
use crate::driver::EventSource;
use crate::error::HidLoggerError;
use crate::event::{codes, RawEvent};
use crate::HidLoggerResult;

type CGEventRef = *mut c_void;
type CGEventTapProxy = *const c_void;
type CFMachPortRef = CFTypeRef;
type CGEventTapCallBack =
    extern "C" fn(CGEventTapProxy, u32, CGEventRef, *mut c_void) -> CGEventRef;

#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code)]
enum CGEventTapLocation {
    HIDEventTap = 0,
    SessionEventTap = 1,
}

#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code)]
enum CGEventTapPlacement {
    HeadInsertEventTap = 0,
    TailAppendEventTap = 1,
}

#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code)]
enum CGEventTapOptions {
    Default = 0,
    ListenOnly = 1,
}

/// `CFRunLoopRunInMode` result when the mode has no sources to service.
const RUN_LOOP_RUN_FINISHED: i32 = 1;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
struct CGPoint {
    x: f64,
    y: f64,
}

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapCreate(
        tap: CGEventTapLocation,
        place: CGEventTapPlacement,
        options: CGEventTapOptions,
        events_of_interest: u64,
        callback: CGEventTapCallBack,
        user_info: *mut c_void,
    ) -> CFMachPortRef;
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
    fn CGEventGetFlags(event: CGEventRef) -> u64;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventGetIntegerValueField(event: CGEventRef, field: u32) -> i64;
    fn CGEventKeyboardGetUnicodeString(
        event: CGEventRef,
        max_len: libc::c_ulong,
        actual_len: *mut libc::c_ulong,
        buf: *mut u16,
    );
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFMachPortCreateRunLoopSource(
        allocator: CFTypeRef,
        port: CFMachPortRef,
        order: isize,
    ) -> CFTypeRef;
    fn CFMachPortInvalidate(port: CFMachPortRef);
    fn CFRunLoopGetCurrent() -> CFTypeRef;
    fn CFRunLoopAddSource(rl: CFTypeRef, source: CFTypeRef, mode: CFTypeRef);
    fn CFRunLoopRemoveSource(rl: CFTypeRef, source: CFTypeRef, mode: CFTypeRef);
    fn CFRunLoopRunInMode(mode: CFTypeRef, seconds: f64, return_after_source_handled: u8) -> i32;
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

/// Whether the process holds the Accessibility permission.
pub fn is_accessibility_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// A borrowed view of a `CGEventRef`, valid for one callback invocation.
pub struct QuartzEvent<'a> {
    event_type: u32,
    event: CGEventRef,
    _callback: PhantomData<&'a ()>,
}

impl QuartzEvent<'_> {
    fn integer_field(&self, field: u32) -> i64 {
        if self.event.is_null() {
            return 0;
        }
        unsafe { CGEventGetIntegerValueField(self.event, field) }
    }
}

impl RawEvent for QuartzEvent<'_> {
    fn event_type(&self) -> u32 {
        self.event_type
    }

    fn flags(&self) -> u64 {
        if self.event.is_null() {
            return 0;
        }
        unsafe { CGEventGetFlags(self.event) }
    }

    fn unicode_units(&self, max_units: usize) -> Option<Vec<u16>> {
        if self.event.is_null() || max_units == 0 {
            return None;
        }

        let mut buf = vec![0u16; max_units];
        let mut len: libc::c_ulong = 0;

        unsafe {
            CGEventKeyboardGetUnicodeString(
                self.event,
                max_units as libc::c_ulong,
                &mut len,
                buf.as_mut_ptr(),
            );
        }

        buf.truncate((len as usize).min(max_units));
        Some(buf)
    }

    fn key_code(&self) -> i64 {
        self.integer_field(codes::KEYBOARD_EVENT_KEYCODE)
    }

    fn location(&self) -> (f64, f64) {
        if self.event.is_null() {
            return (0.0, 0.0);
        }
        let point = unsafe { CGEventGetLocation(self.event) };

        (point.x, point.y)
    }

    fn scroll_axes(&self) -> (i64, i64) {
        (
            self.integer_field(codes::SCROLL_WHEEL_EVENT_DELTA_AXIS_1),
            self.integer_field(codes::SCROLL_WHEEL_EVENT_DELTA_AXIS_2),
        )
    }
}

struct MachPortTap(CFMachPortRef);

impl TapControl for MachPortTap {
    fn reenable(&self) {
        if !self.0.is_null() {
            unsafe { CGEventTapEnable(self.0, true) };
        }
    }
}

/// State reachable from the C callback through its `user_info` pointer.
struct TapContext {
    handler: Box<dyn EventHandler>,
    port: CFMachPortRef,
}

extern "C" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef {
    if user_info.is_null() {
        return event;
    }

    // The callback only runs inside `CFRunLoopRunInMode` on the thread that owns the tap, and
    // nothing else touches the context while the run loop is pumping.
    let context = unsafe { &mut *(user_info as *mut TapContext) };
    let view = QuartzEvent {
        event_type,
        event,
        _callback: PhantomData,
    };
    let tap = MachPortTap(context.port);

    let decision = panic::catch_unwind(AssertUnwindSafe(|| {
        context.handler.handle_event(&view, &tap)
    }))
    .unwrap_or_else(|_| {
        error!("event handler panicked, passing event through");
        Decision::Forward
    });

    match decision {
        Decision::Forward => event,
        Decision::Suppress => ptr::null_mut(),
    }
}

/// An installed Quartz event tap, attached to the current thread's run loop.
///
/// Dropping it disables and removes the tap.
pub struct QuartzEventTap {
    port: CFMachPortRef,
    run_loop_source: CFTypeRef,
    run_loop: CFTypeRef,
    context: *mut TapContext,
}

impl QuartzEventTap {
    /// Create the tap for every intercepted event type and enable it.
    pub fn new(handler: Box<dyn EventHandler>) -> HidLoggerResult<Self> {
        let context = Box::into_raw(Box::new(TapContext {
            handler,
            port: ptr::null(),
        }));

        let port = unsafe {
            CGEventTapCreate(
                CGEventTapLocation::HIDEventTap,
                CGEventTapPlacement::HeadInsertEventTap,
                CGEventTapOptions::Default,
                codes::interception_mask(),
                tap_callback,
                context.cast(),
            )
        };

        if port.is_null() {
            drop(unsafe { Box::from_raw(context) });

            if !is_accessibility_trusted() {
                warn!("process is not trusted for accessibility");
            }
            return Err(HidLoggerError::TapCreationFailed);
        }

        unsafe { (*context).port = port };

        let run_loop_source = unsafe { CFMachPortCreateRunLoopSource(ptr::null(), port, 0) };

        if run_loop_source.is_null() {
            unsafe {
                CFMachPortInvalidate(port);
                CFRelease(port);
                drop(Box::from_raw(context));
            }
            return Err(HidLoggerError::RunLoopSourceFailed);
        }

        let run_loop = unsafe { CFRunLoopGetCurrent() };

        unsafe {
            CFRunLoopAddSource(run_loop, run_loop_source, kCFRunLoopCommonModes as CFTypeRef);
            CGEventTapEnable(port, true);
        }

        info!("event tap installed");

        Ok(Self {
            port,
            run_loop_source,
            run_loop,
            context,
        })
    }
}

impl EventSource for QuartzEventTap {
    fn pump(&mut self, slice: Duration) -> HidLoggerResult<()> {
        let result = unsafe {
            CFRunLoopRunInMode(kCFRunLoopDefaultMode as CFTypeRef, slice.as_secs_f64(), 0)
        };

        if result == RUN_LOOP_RUN_FINISHED {
            // Nothing attached to the mode; the call returns immediately.
            thread::sleep(slice);
        }

        Ok(())
    }
}

impl Drop for QuartzEventTap {
    fn drop(&mut self) {
        unsafe {
            CGEventTapEnable(self.port, false);
            CFRunLoopRemoveSource(
                self.run_loop,
                self.run_loop_source,
                kCFRunLoopCommonModes as CFTypeRef,
            );
            CFRelease(self.run_loop_source);
            CFMachPortInvalidate(self.port);
            CFRelease(self.port);
            drop(Box::from_raw(self.context));
        }

        info!("event tap removed");
    }
}
