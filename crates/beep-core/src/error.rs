//! Error types for the driver layer.
//!
//! Detection never produces one of these: a device that cannot be claimed is
//! an expected outcome and is reported as `false` by `detect`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a `begin_tone`/`end_tone` call on a backend.
///
/// Callers outside of tests should go through
/// [`ActiveDriver`](crate::active::ActiveDriver), which treats every variant
/// as fatal.
#[derive(Error, Debug)]
pub enum ToneError {
    /// Tone requested before a successful detect and init, or after fini.
    #[error("{driver} driver used before detect and init")]
    NotReady { driver: &'static str },

    /// The console rejected the sound-control request.
    #[error("ioctl KIOCSOUND on {}: {source}", .device.display())]
    Control {
        device: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a PWM attribute failed.
    #[error("write to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Registration refused by the [`DriverRegistry`](crate::registry::DriverRegistry).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("cannot register driver '{name}': registry is frozen after the first selection")]
    Frozen { name: &'static str },

    #[error("a driver named '{name}' is already registered")]
    DuplicateName { name: &'static str },
}

/// No driver could be bound.
#[derive(Error, Debug)]
pub enum SelectError {
    #[error("no beep drivers registered")]
    Empty,

    #[error("no beep driver could claim {}", describe_device(.device))]
    NoDevice { device: Option<PathBuf> },
}

fn describe_device(device: &Option<PathBuf>) -> String {
    match device {
        Some(path) => format!("device {}", path.display()),
        None => "any default device".to_string(),
    }
}
