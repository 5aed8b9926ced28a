//! Ordered set of available drivers and the selection procedure.
//!
//! Registration order is detection priority. The registry freezes on the
//! first call to [`DriverRegistry::select`]; later registrations are refused.

use std::path::Path;

use crate::active::ActiveDriver;
use crate::console::ConsoleDriver;
use crate::driver::{BeepDriver, Driver};
use crate::error::{RegistryError, SelectError};
use crate::sysfs::SysfsDriver;

#[derive(Default)]
pub struct DriverRegistry {
    drivers: Vec<Driver>,
    frozen: bool,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in driver: console first, then sysfs.
    pub fn with_default_drivers() -> Self {
        let drivers: Vec<Driver> = vec![ConsoleDriver::new().into(), SysfsDriver::new().into()];
        for driver in &drivers {
            log::debug!("registering driver {}", driver.name());
        }
        Self {
            drivers,
            frozen: false,
        }
    }

    pub fn register(&mut self, driver: impl Into<Driver>) -> Result<(), RegistryError> {
        let driver = driver.into();
        let name = driver.name();
        if self.frozen {
            return Err(RegistryError::Frozen { name });
        }
        if self.drivers.iter().any(|known| known.name() == name) {
            return Err(RegistryError::DuplicateName { name });
        }
        log::debug!("registering driver {name}");
        self.drivers.push(driver);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Drivers in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.drivers.iter().map(|driver| driver.name())
    }

    /// Bind the first driver that detects `device` (or one of its own
    /// defaults when `device` is `None`), after running its `init`.
    ///
    /// The same `device` is offered to every driver.
    pub fn select(&mut self, device: Option<&Path>) -> Result<ActiveDriver<'_>, SelectError> {
        self.frozen = true;
        if self.drivers.is_empty() {
            return Err(SelectError::Empty);
        }

        for driver in self.drivers.iter_mut() {
            if driver.detect(device) {
                log::info!(
                    "using {} driver on {}",
                    driver.name(),
                    driver.device_name().unwrap_or(Path::new("?")).display()
                );
                driver.init();
                return Ok(ActiveDriver::new(driver));
            }
            log::debug!("{} driver found no usable device", driver.name());
        }

        Err(SelectError::NoDevice {
            device: device.map(Path::to_path_buf),
        })
    }
}
