//! Console backend - PC speaker through the `KIOCSOUND` console ioctl.
//!
//! The speaker is driven by the legacy PIT: a tone is requested by handing
//! the kernel a countdown divisor of [`CLOCK_TICK_RATE`]. A divisor of 0 is
//! the hardware's own encoding for silence.

use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use crate::device::open_checked_char_device;
use crate::driver::BeepDriver;
use crate::error::ToneError;

/// PIT_TICK_RATE as used by the kernel.
pub const CLOCK_TICK_RATE: u32 = 1_193_182;

/// Console devices tried, in order, when no device is given.
pub const DEFAULT_CONSOLE_DEVICES: [&str; 2] = ["/dev/tty0", "/dev/vc/0"];

const NAME: &str = "console";

// <linux/kd.h>
const KIOCSOUND: u32 = 0x4B2F;

/// Convert a frequency to the PIT divisor sent with `KIOCSOUND`.
///
/// `0` stays `0` (silence); everything else is `CLOCK_TICK_RATE / freq`
/// truncated to the low 16 bits.
pub fn tone_divisor(frequency_hz: u16) -> u16 {
    if frequency_hz == 0 {
        return 0;
    }
    ((CLOCK_TICK_RATE / u32::from(frequency_hz)) & 0xffff) as u16
}

/// The sound-control request issued on an open console.
pub trait SoundControl {
    fn set_divisor(&self, console: &File, divisor: u16) -> io::Result<()>;
}

/// Real `ioctl(fd, KIOCSOUND, divisor)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Kiocsound;

impl SoundControl for Kiocsound {
    fn set_divisor(&self, console: &File, divisor: u16) -> io::Result<()> {
        // SAFETY: KIOCSOUND takes its argument by value and the fd is owned
        // by `console` for the duration of the call.
        let rc = unsafe {
            libc::ioctl(
                console.as_raw_fd(),
                KIOCSOUND as _,
                libc::c_ulong::from(divisor),
            )
        };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

pub struct ConsoleDriver<S = Kiocsound> {
    candidates: Vec<PathBuf>,
    control: S,
    device_name: Option<PathBuf>,
    console: Option<File>,
    ready: bool,
}

impl ConsoleDriver {
    pub fn new() -> Self {
        Self::with_control(Kiocsound)
    }
}

impl Default for ConsoleDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SoundControl> ConsoleDriver<S> {
    /// Console backend using `control` for the sound requests.
    pub fn with_control(control: S) -> Self {
        Self {
            candidates: DEFAULT_CONSOLE_DEVICES.iter().map(PathBuf::from).collect(),
            control,
            device_name: None,
            console: None,
            ready: false,
        }
    }

    /// Replace the default candidate list.
    pub fn with_candidates<I, P>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Open `path` and check that it answers a silence request.
    fn open_checked_device(&self, path: &Path) -> Option<File> {
        let console = match open_checked_char_device(path) {
            Ok(console) => console,
            Err(err) => {
                log::debug!("console: cannot open {}: {err}", path.display());
                return None;
            }
        };
        if let Err(err) = self.control.set_divisor(&console, 0) {
            log::debug!(
                "console: {} does not implement KIOCSOUND API: {err}",
                path.display()
            );
            return None;
        }
        Some(console)
    }

    fn send(&self, divisor: u16) -> Result<(), ToneError> {
        let console = match (&self.console, self.ready) {
            (Some(console), true) => console,
            _ => return Err(ToneError::NotReady { driver: NAME }),
        };
        self.control
            .set_divisor(console, divisor)
            .map_err(|source| ToneError::Control {
                device: self.device_name.clone().unwrap_or_default(),
                source,
            })
    }
}

impl<S: SoundControl> BeepDriver for ConsoleDriver<S> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn device_name(&self) -> Option<&Path> {
        self.device_name.as_deref()
    }

    fn is_bound(&self) -> bool {
        self.console.is_some()
    }

    fn detect(&mut self, device: Option<&Path>) -> bool {
        log::debug!("console driver_detect {device:?}");
        if self.is_bound() {
            self.fini();
        }

        let claimed = match device {
            Some(path) => self
                .open_checked_device(path)
                .map(|console| (path.to_path_buf(), console)),
            None => self.candidates.iter().find_map(|path| {
                self.open_checked_device(path)
                    .map(|console| (path.clone(), console))
            }),
        };

        match claimed {
            Some((path, console)) => {
                self.device_name = Some(path);
                self.console = Some(console);
                true
            }
            None => false,
        }
    }

    fn init(&mut self) {
        log::debug!("console driver_init {:?}", self.device_name);
        self.ready = self.console.is_some();
    }

    fn begin_tone(&mut self, frequency_hz: u16) -> Result<(), ToneError> {
        log::debug!("console driver_begin_tone {frequency_hz}");
        self.send(tone_divisor(frequency_hz))
    }

    fn end_tone(&mut self) -> Result<(), ToneError> {
        log::debug!("console driver_end_tone");
        self.send(0)
    }

    fn fini(&mut self) {
        log::debug!("console driver_fini {:?}", self.device_name);
        self.console = None;
        self.device_name = None;
        self.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        divisors: Rc<RefCell<Vec<u16>>>,
        reject: Rc<Cell<bool>>,
    }

    impl SoundControl for Recorder {
        fn set_divisor(&self, _console: &File, divisor: u16) -> io::Result<()> {
            if self.reject.get() {
                return Err(io::Error::from_raw_os_error(libc::ENOTTY));
            }
            self.divisors.borrow_mut().push(divisor);
            Ok(())
        }
    }

    fn recording_driver(candidates: &[&str]) -> (ConsoleDriver<Recorder>, Recorder) {
        let recorder = Recorder::default();
        let driver =
            ConsoleDriver::with_control(recorder.clone()).with_candidates(candidates.iter().copied());
        (driver, recorder)
    }

    #[test]
    fn test_divisor_for_a4() {
        // 1193182 / 440 = 2711.77
        assert_eq!(tone_divisor(440), 2711);
    }

    #[test]
    fn test_divisor_for_zero_is_silence() {
        assert_eq!(tone_divisor(0), 0);
    }

    #[test]
    fn test_divisor_masked_to_16_bits() {
        assert_eq!(tone_divisor(1), (1_193_182u32 & 0xffff) as u16);
        assert_eq!(tone_divisor(18), (66_287u32 & 0xffff) as u16);
        assert_eq!(tone_divisor(19), 62_799);
    }

    #[test]
    fn test_default_candidates() {
        let driver = ConsoleDriver::new();
        let expected: Vec<PathBuf> = vec!["/dev/tty0".into(), "/dev/vc/0".into()];
        assert_eq!(driver.candidates, expected);
    }

    #[test]
    fn test_detect_rejects_device_without_kiocsound() {
        // /dev/null is a character device but not a console
        let mut driver = ConsoleDriver::new();
        assert!(!driver.detect(Some(Path::new("/dev/null"))));
        assert!(!driver.is_bound());
        assert_eq!(driver.device_name(), None);
    }

    #[test]
    fn test_detect_rejects_regular_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut driver, recorder) = recording_driver(&[]);
        assert!(!driver.detect(Some(file.path())));
        assert!(!driver.is_bound());
        assert!(recorder.divisors.borrow().is_empty());
    }

    #[test]
    fn test_detect_tries_candidates_in_order() {
        let (mut driver, recorder) =
            recording_driver(&["/nonexistent/tty0", "/dev/null", "/dev/zero"]);
        assert!(driver.detect(None));
        assert_eq!(driver.device_name(), Some(Path::new("/dev/null")));
        assert!(driver.is_bound());
        // one silence probe for the claimed device, none after it
        assert_eq!(*recorder.divisors.borrow(), vec![0]);
    }

    #[test]
    fn test_detect_fails_when_no_candidate_answers() {
        let (mut driver, recorder) = recording_driver(&["/dev/null", "/dev/zero"]);
        recorder.reject.set(true);
        assert!(!driver.detect(None));
        assert!(!driver.is_bound());
        assert_eq!(driver.device_name(), None);
    }

    #[test]
    fn test_explicit_device_does_not_fall_back() {
        let (mut driver, _recorder) = recording_driver(&["/dev/null"]);
        assert!(!driver.detect(Some(Path::new("/nonexistent/tty0"))));
        assert!(!driver.is_bound());
    }

    #[test]
    fn test_begin_then_end_sends_silence() {
        let (mut driver, recorder) = recording_driver(&["/dev/null"]);
        assert!(driver.detect(None));
        driver.init();
        driver.begin_tone(440).unwrap();
        driver.begin_tone(880).unwrap();
        driver.end_tone().unwrap();
        assert_eq!(*recorder.divisors.borrow(), vec![0, 2711, 1355, 0]);
    }

    #[test]
    fn test_begin_tone_zero_is_silence() {
        let (mut driver, recorder) = recording_driver(&["/dev/null"]);
        assert!(driver.detect(None));
        driver.init();
        driver.begin_tone(0).unwrap();
        assert_eq!(recorder.divisors.borrow().last(), Some(&0));
    }

    #[test]
    fn test_tone_before_init_is_reported() {
        let (mut driver, _recorder) = recording_driver(&["/dev/null"]);
        assert!(matches!(
            driver.begin_tone(440),
            Err(ToneError::NotReady { driver: "console" })
        ));
        assert!(driver.detect(None));
        assert!(matches!(driver.end_tone(), Err(ToneError::NotReady { .. })));
    }

    #[test]
    fn test_control_failure_is_reported() {
        let (mut driver, recorder) = recording_driver(&["/dev/null"]);
        assert!(driver.detect(None));
        driver.init();
        recorder.reject.set(true);
        match driver.begin_tone(440) {
            Err(ToneError::Control { device, .. }) => assert_eq!(device, PathBuf::from("/dev/null")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_fini_allows_redetect() {
        let (mut driver, _recorder) = recording_driver(&["/dev/null"]);
        assert!(driver.detect(None));
        driver.init();
        driver.fini();
        assert!(!driver.is_bound());
        assert_eq!(driver.device_name(), None);
        assert!(matches!(driver.begin_tone(440), Err(ToneError::NotReady { .. })));

        assert!(driver.detect(Some(Path::new("/dev/null"))));
        driver.init();
        assert!(driver.begin_tone(440).is_ok());
    }

    #[test]
    fn test_fini_without_detect_is_noop() {
        let mut driver = ConsoleDriver::new();
        driver.fini();
        assert!(!driver.is_bound());
    }
}
