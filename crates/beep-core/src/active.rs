//! The driver bound by a successful selection.

use std::path::Path;

use crate::driver::{BeepDriver, Driver};
use crate::error::ToneError;

/// A detected and initialized driver, borrowed from its registry.
///
/// Tone failures are not returned: a backend that cannot start a tone may
/// not be able to stop one either, so any [`ToneError`] ends the process
/// with exit status 1. Dropping the value runs the backend's `fini`.
pub struct ActiveDriver<'r> {
    driver: &'r mut Driver,
}

impl<'r> ActiveDriver<'r> {
    pub(crate) fn new(driver: &'r mut Driver) -> Self {
        Self { driver }
    }

    pub fn name(&self) -> &'static str {
        self.driver.name()
    }

    pub fn device_name(&self) -> Option<&Path> {
        self.driver.device_name()
    }

    pub fn begin_tone(&mut self, frequency_hz: u16) {
        if let Err(err) = self.driver.begin_tone(frequency_hz) {
            fatal(self.driver.name(), err);
        }
    }

    pub fn end_tone(&mut self) {
        if let Err(err) = self.driver.end_tone() {
            fatal(self.driver.name(), err);
        }
    }

    /// Release the device. Equivalent to dropping.
    pub fn fini(self) {}
}

impl Drop for ActiveDriver<'_> {
    fn drop(&mut self) {
        self.driver.fini();
    }
}

fn fatal(driver: &str, err: ToneError) -> ! {
    log::error!("{driver}: {err}");
    log::error!("{driver}: the tone may not be stoppable, exiting");
    std::process::exit(1)
}
