//! PWM sysfs backend - square wave on a PWM channel exported under
//! `/sys/class/pwm`.
//!
//! A channel is driven through two attribute files, `duty_cycle` and
//! `period`, both taking nanoseconds as ASCII decimal followed by a newline.
//! The duty cycle is fixed at half the period.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::device::open_writable;
use crate::driver::BeepDriver;
use crate::error::ToneError;

/// Channel used when no device is given.
pub const DEFAULT_PWM_CHANNEL: &str = "/sys/class/pwm/pwmchip0/pwm0";

const NAME: &str = "sysfs";
const NANOS_PER_SEC: u32 = 1_000_000_000;

/// The two attribute files of one PWM channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwmChannel {
    pub duty_cycle: PathBuf,
    pub period: PathBuf,
}

impl PwmChannel {
    /// `duty_cycle` and `period` inside a channel directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            duty_cycle: dir.join("duty_cycle"),
            period: dir.join("period"),
        }
    }

    /// Interpret a user-supplied device path.
    ///
    /// A directory is taken as the channel directory. Anything else names
    /// the duty-cycle file, and `period` is looked up next to it.
    pub fn from_device(path: &Path) -> Self {
        if path.is_dir() {
            return Self::in_dir(path);
        }
        let period = match path.parent() {
            Some(dir) => dir.join("period"),
            None => PathBuf::from("period"),
        };
        Self {
            duty_cycle: path.to_path_buf(),
            period,
        }
    }
}

/// Period and duty cycle in nanoseconds for one tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTiming {
    pub period_ns: u32,
    pub duty_ns: u32,
}

/// Timing for `frequency_hz`, or `None` for 0 which has no period.
pub fn pwm_timing(frequency_hz: u16) -> Option<PwmTiming> {
    if frequency_hz == 0 {
        return None;
    }
    let period_ns = NANOS_PER_SEC / u32::from(frequency_hz);
    Some(PwmTiming {
        period_ns,
        duty_ns: period_ns / 2,
    })
}

struct Claim {
    channel: PwmChannel,
    duty_cycle: File,
    period: File,
}

impl Claim {
    fn open(channel: &PwmChannel) -> Option<Self> {
        let duty_cycle = match open_writable(&channel.duty_cycle) {
            Ok(file) => file,
            Err(err) => {
                log::debug!("sysfs: cannot open {}: {err}", channel.duty_cycle.display());
                return None;
            }
        };
        // duty_cycle is closed on drop if period is missing
        let period = match open_writable(&channel.period) {
            Ok(file) => file,
            Err(err) => {
                log::debug!("sysfs: cannot open {}: {err}", channel.period.display());
                return None;
            }
        };
        Some(Self {
            channel: channel.clone(),
            duty_cycle,
            period,
        })
    }
}

fn write_attr(mut file: &File, path: &Path, value: u32) -> Result<(), ToneError> {
    file.write_all(format!("{value}\n").as_bytes())
        .map_err(|source| ToneError::Write {
            path: path.to_path_buf(),
            source,
        })
}

pub struct SysfsDriver {
    candidates: Vec<PwmChannel>,
    claim: Option<Claim>,
    ready: bool,
}

impl SysfsDriver {
    pub fn new() -> Self {
        Self::with_channels([PwmChannel::in_dir(DEFAULT_PWM_CHANNEL)])
    }

    /// Driver probing `channels` in order when no device is given.
    pub fn with_channels(channels: impl IntoIterator<Item = PwmChannel>) -> Self {
        Self {
            candidates: channels.into_iter().collect(),
            claim: None,
            ready: false,
        }
    }

    fn ready_claim(&self) -> Result<&Claim, ToneError> {
        match (&self.claim, self.ready) {
            (Some(claim), true) => Ok(claim),
            _ => Err(ToneError::NotReady { driver: NAME }),
        }
    }
}

impl Default for SysfsDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl BeepDriver for SysfsDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn device_name(&self) -> Option<&Path> {
        self.claim
            .as_ref()
            .map(|claim| claim.channel.duty_cycle.as_path())
    }

    fn is_bound(&self) -> bool {
        self.claim.is_some()
    }

    fn detect(&mut self, device: Option<&Path>) -> bool {
        log::debug!("sysfs driver_detect {device:?}");
        if self.is_bound() {
            self.fini();
        }

        self.claim = match device {
            Some(path) => Claim::open(&PwmChannel::from_device(path)),
            None => self.candidates.iter().find_map(Claim::open),
        };
        self.claim.is_some()
    }

    fn init(&mut self) {
        log::debug!("sysfs driver_init {:?}", self.device_name());
        self.ready = self.claim.is_some();
    }

    fn begin_tone(&mut self, frequency_hz: u16) -> Result<(), ToneError> {
        let Some(timing) = pwm_timing(frequency_hz) else {
            log::debug!("sysfs driver_begin_tone 0 -> silence");
            return self.end_tone();
        };
        log::debug!(
            "sysfs driver_begin_tone {frequency_hz} -> period {}, duty {}",
            timing.period_ns,
            timing.duty_ns
        );
        let claim = self.ready_claim()?;
        write_attr(&claim.duty_cycle, &claim.channel.duty_cycle, timing.duty_ns)?;
        write_attr(&claim.period, &claim.channel.period, timing.period_ns)
    }

    fn end_tone(&mut self) -> Result<(), ToneError> {
        log::debug!("sysfs driver_end_tone");
        let claim = self.ready_claim()?;
        // period keeps its last value, a zero duty cycle is enough
        write_attr(&claim.duty_cycle, &claim.channel.duty_cycle, 0)
    }

    fn fini(&mut self) {
        log::debug!("sysfs driver_fini {:?}", self.device_name());
        self.claim = None;
        self.ready = false;
    }
}
