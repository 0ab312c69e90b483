use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidLoggerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to create event tap")]
    TapCreationFailed,
    #[error("failed to create a run loop source for the event tap")]
    RunLoopSourceFailed,
    #[error("no input devices found")]
    NoDevicesFound,
    #[error("event interception is not supported on this platform")]
    UnsupportedPlatform,
}

impl HidLoggerError {
    /// Guidance for the user on how to fix a failure to install the interception point.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::TapCreationFailed | Self::RunLoopSourceFailed => Some(
                "Please grant Accessibility permissions in System Settings > Privacy & Security.",
            ),
            Self::NoDevicesFound => Some(
                "Please run as root or add your user to the 'input' group to read /dev/input.",
            ),
            Self::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => Some(
                "Please run as root or add your user to the 'input' group to read /dev/input.",
            ),
            Self::UnsupportedPlatform => Some("Only macOS and Linux are supported."),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_failure_points_at_accessibility() {
        let err = HidLoggerError::TapCreationFailed;

        assert!(err.remediation().unwrap().contains("Accessibility"));
    }

    #[test]
    fn plain_io_errors_have_no_guidance() {
        let err = HidLoggerError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));

        assert!(err.remediation().is_none());
    }

    #[test]
    fn permission_denied_points_at_input_group() {
        let err = HidLoggerError::from(io::Error::from(io::ErrorKind::PermissionDenied));

        assert!(err.remediation().unwrap().contains("input"));
    }
}
