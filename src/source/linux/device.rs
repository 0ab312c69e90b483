use std::fs::{self, File};
use std::future::Future;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::ready;
use tokio::io::unix::AsyncFd;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use super::codes::{EV_ABS, EV_KEY, EV_MSC, EV_REL, EV_REP, EV_SYN, KEY_MAX};
use crate::error::HidLoggerError;
use crate::HidLoggerResult;

const IOC_NRBITS: libc::c_ulong = 8;
const IOC_TYPEBITS: libc::c_ulong = 8;
const IOC_SIZEBITS: libc::c_ulong = 14;
const IOC_TYPESHIFT: libc::c_ulong = IOC_NRBITS;
const IOC_SIZESHIFT: libc::c_ulong = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: libc::c_ulong = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_WRITE: libc::c_ulong = 1;
const IOC_READ: libc::c_ulong = 2;

/// An evdev (`'E'`) ioctl request number, as built by the kernel's `_IOC` macro.
const fn evdev_ioc(dir: libc::c_ulong, nr: libc::c_ulong, size: usize) -> libc::c_ulong {
    (dir << IOC_DIRSHIFT)
        | ((b'E' as libc::c_ulong) << IOC_TYPESHIFT)
        | nr
        | ((size as libc::c_ulong) << IOC_SIZESHIFT)
}

/// Size of the `EVIOCGKEY` bitmap: one bit per key code up to `KEY_MAX`.
const KEY_STATE_LEN: usize = KEY_MAX as usize / 8 + 1;

/// How often the key state is polled while waiting for keys to be released.
const RELEASE_POLL_INTERVAL: Duration = Duration::from_millis(20);

const INPUT_DIR: &str = "/dev/input";

/// An open evdev input device that reports key or relative pointer events.
#[derive(Debug)]
pub(crate) struct InputDevice {
    /// The name of the device.
    name: String,
    /// The path of the input device (e.g. `/dev/input/event0`).
    path: PathBuf,
    /// The file descriptor of the open input device file.
    async_fd: AsyncFd<File>,
}

impl TryFrom<&Path> for InputDevice {
    type Error = HidLoggerError;

    /// Open `path`. Must be called from within a tokio runtime.
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let file = File::open(path)?;
        let flags = read_event_flags(&file)?;

        if !has_keyboard_flags(flags) && !has_pointer_flags(flags) {
            if has_absolute_pointer_flags(flags) {
                debug!("{} reports absolute motion only, not read", path.display());
            }
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not a keyboard or mouse").into());
        }

        set_nonblocking(&file)?;

        let name = read_name(&file)?;

        Ok(Self {
            name,
            path: path.to_path_buf(),
            async_fd: AsyncFd::new(file)?,
        })
    }
}

impl InputDevice {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next batch of input events.
    pub(crate) fn read_input_events(&self) -> InputEventFuture<'_> {
        InputEventFuture(self)
    }

    /// Take exclusive ownership of the device with `EVIOCGRAB`, so that its events no longer
    /// reach any other reader (including the display server).
    pub(crate) fn grab(&self) -> HidLoggerResult<()> {
        let eviocgrab = evdev_ioc(IOC_WRITE, 0x90, mem::size_of::<libc::c_int>());

        let res = unsafe { libc::ioctl(self.async_fd.as_raw_fd(), eviocgrab, 1 as libc::c_int) };

        if res < 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(())
    }

    /// Wait until no key of the device is held down, for at most `timeout`.
    ///
    /// A key still down when the device is grabbed never has its release seen by the display
    /// server, which then repeats it until the grab ends. Returns whether the keys were released
    /// in time.
    pub(crate) async fn wait_for_release(&self, timeout: Duration) -> HidLoggerResult<bool> {
        let deadline = Instant::now() + timeout;

        loop {
            if all_keys_released(&read_key_state(self.async_fd.get_ref())?) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                warn!("keys still held on {}", self.name);
                return Ok(false);
            }
            time::sleep(RELEASE_POLL_INTERVAL).await;
        }
    }
}

/// A future that resolves once a number of input events have been read from a device.
pub(crate) struct InputEventFuture<'a>(&'a InputDevice);

impl Future for InputEventFuture<'_> {
    type Output = io::Result<Vec<libc::input_event>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut guard = ready!(self.0.async_fd.poll_read_ready(cx))?;

            match guard.try_io(|inner| read_input_events(inner.as_raw_fd())) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }
}

/// Read [`libc::input_event`s](libc::input_event) from the specified file descriptor.
fn read_input_events(fd: RawFd) -> io::Result<Vec<libc::input_event>> {
    const MAX_INPUT_EV: usize = 128;

    let mut input_events = [mem::MaybeUninit::<libc::input_event>::uninit(); MAX_INPUT_EV];

    let n = unsafe {
        libc::read(
            fd,
            input_events.as_mut_ptr() as *mut _,
            MAX_INPUT_EV * mem::size_of::<libc::input_event>(),
        )
    };

    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    let n = (n as usize) / mem::size_of::<libc::input_event>();

    // The first n elements of the array are initialized:
    Ok(input_events[..n]
        .iter()
        .map(|e| unsafe { e.assume_init() })
        .collect())
}

/// Open every keyboard and mouse under `/dev/input`. Must be called from within a tokio runtime.
///
/// If no device could be opened and at least one was refused for lack of permission, the
/// permission error is returned so that the caller can say what to do about it.
pub(crate) fn find_input_devices() -> HidLoggerResult<Vec<InputDevice>> {
    let mut devices = Vec::new();
    let mut permission_denied = None;

    for path in find_char_devices()? {
        match InputDevice::try_from(path.as_path()) {
            Ok(device) => devices.push(device),
            Err(HidLoggerError::Io(e)) if e.kind() == io::ErrorKind::PermissionDenied => {
                debug!("cannot open {}: {e}", path.display());
                permission_denied = Some(e);
            }
            Err(e) => debug!("skipping {}: {e}", path.display()),
        }
    }

    match (devices.is_empty(), permission_denied) {
        (true, Some(e)) => Err(e.into()),
        (true, None) => Err(HidLoggerError::NoDevicesFound),
        (false, _) => Ok(devices),
    }
}

/// Set the `O_NONBLOCK` flag for the specified file.
fn set_nonblocking(f: &File) -> HidLoggerResult<()> {
    let res = unsafe { libc::fcntl(f.as_raw_fd(), libc::F_SETFL, libc::O_NONBLOCK) };

    if res < 0 {
        return Err(io::Error::last_os_error().into());
    }

    Ok(())
}

/// Read the name of the specified device using the `EVIOCGNAME` ioctl.
fn read_name(f: &File) -> HidLoggerResult<String> {
    const DEVICE_NAME_MAX_LEN: usize = 512;

    let mut device_name = [0u8; DEVICE_NAME_MAX_LEN];

    let eviocgname = evdev_ioc(IOC_READ, 0x06, device_name.len());

    ioctl(
        f.as_raw_fd(),
        eviocgname,
        device_name.as_mut_ptr() as *mut libc::c_ulong,
    )?;

    let len = device_name
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(device_name.len());

    Ok(String::from_utf8_lossy(&device_name[..len]).into())
}

/// Read the event types supported by the specified device using the `EVIOCGBIT` ioctl.
fn read_event_flags(f: &File) -> HidLoggerResult<libc::c_ulong> {
    let mut ev_flags: libc::c_ulong = 0;

    let eviocgbit = evdev_ioc(IOC_READ, 0x20, mem::size_of::<libc::c_ulong>());

    ioctl(
        f.as_raw_fd(),
        eviocgbit,
        (&mut ev_flags) as *mut libc::c_ulong,
    )?;

    Ok(ev_flags)
}

/// Read the pressed state of every key of the device using the `EVIOCGKEY` ioctl.
fn read_key_state(f: &File) -> HidLoggerResult<[u8; KEY_STATE_LEN]> {
    let mut keys = [0u8; KEY_STATE_LEN];

    ioctl(
        f.as_raw_fd(),
        evdev_ioc(IOC_READ, 0x18, keys.len()),
        keys.as_mut_ptr() as *mut libc::c_ulong,
    )?;

    Ok(keys)
}

/// Whether an `EVIOCGKEY` bitmap has no key down.
fn all_keys_released(keys: &[u8]) -> bool {
    keys.iter().all(|&byte| byte == 0)
}

/// Get all character devices from `/dev/input`.
fn find_char_devices() -> HidLoggerResult<impl Iterator<Item = PathBuf>> {
    Ok(fs::read_dir(INPUT_DIR)?.filter_map(|entry| {
        let entry = entry.ok()?;
        let file_type = fs::metadata(entry.path()).ok()?.file_type();

        if file_type.is_char_device() {
            Some(entry.path())
        } else {
            None
        }
    }))
}

fn ioctl(fd: RawFd, request: libc::c_ulong, buf: *mut libc::c_ulong) -> HidLoggerResult<()> {
    let res = unsafe { libc::ioctl(fd, request, buf) };

    if res < 0 {
        Err(io::Error::last_os_error().into())
    } else {
        Ok(())
    }
}

/// Check whether the specified `flags` indicate the device is a keyboard.
fn has_keyboard_flags(flags: libc::c_ulong) -> bool {
    const KEYBOARD_FLAGS: libc::c_ulong =
        (1 << EV_SYN) | (1 << EV_KEY) | (1 << EV_MSC) | (1 << EV_REP);

    (flags & KEYBOARD_FLAGS) == KEYBOARD_FLAGS
}

/// Check whether the specified `flags` indicate the device moves a pointer.
fn has_pointer_flags(flags: libc::c_ulong) -> bool {
    const POINTER_FLAGS: libc::c_ulong = (1 << EV_SYN) | (1 << EV_KEY) | (1 << EV_REL);

    (flags & POINTER_FLAGS) == POINTER_FLAGS
}

/// Check whether the specified `flags` indicate an absolute pointer (touchpad, tablet) that has no
/// relative motion.
fn has_absolute_pointer_flags(flags: libc::c_ulong) -> bool {
    const ABSOLUTE_FLAGS: libc::c_ulong = (1 << EV_SYN) | (1 << EV_KEY) | (1 << EV_ABS);

    (flags & ABSOLUTE_FLAGS) == ABSOLUTE_FLAGS && flags & (1 << EV_REL) == 0
}
