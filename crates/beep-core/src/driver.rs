use std::path::Path;

use enum_dispatch::enum_dispatch;

use crate::console::ConsoleDriver;
use crate::error::ToneError;
use crate::sysfs::SysfsDriver;

/// Contract every tone backend implements.
///
/// Lifecycle: `detect` -> `init` -> any number of `begin_tone`/`end_tone`
/// -> `fini`. Handles are held exactly between a successful `detect` and
/// the following `fini`.
#[enum_dispatch]
pub trait BeepDriver {
    /// Stable identifier, unique within a registry.
    fn name(&self) -> &'static str;

    /// Path claimed by the last successful `detect`.
    fn device_name(&self) -> Option<&Path>;

    /// Whether the backend currently holds its device handle(s).
    fn is_bound(&self) -> bool;

    /// Try to claim `device`, or the backend's default candidates in order
    /// when `device` is `None`. An explicit path is never followed by the
    /// defaults. Leaves no handle open on failure.
    fn detect(&mut self, device: Option<&Path>) -> bool;

    fn init(&mut self);

    /// Start (or retune) a continuous tone. `0` means silence.
    fn begin_tone(&mut self, frequency_hz: u16) -> Result<(), ToneError>;

    /// Silence the output. Safe to call when nothing is sounding.
    fn end_tone(&mut self) -> Result<(), ToneError>;

    /// Close all handles. No-op when nothing is bound.
    fn fini(&mut self);
}

// closed set, order here has no effect on detection priority
#[enum_dispatch(BeepDriver)]
pub enum Driver {
    Console(ConsoleDriver),
    Sysfs(SysfsDriver),
}
