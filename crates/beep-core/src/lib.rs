//! Tone drivers for the PC speaker and PWM buzzers.
//!
//! A [`DriverRegistry`] holds the available backends in priority order;
//! [`DriverRegistry::select`] binds the first one that finds working
//! hardware and hands back an [`ActiveDriver`].

pub mod active;
pub mod console;
pub mod device;
pub mod driver;
pub mod error;
pub mod registry;
pub mod sysfs;

pub use active::ActiveDriver;
pub use driver::{BeepDriver, Driver};
pub use error::{RegistryError, SelectError, ToneError};
pub use registry::DriverRegistry;
