//! Command-line parsing.
//!
//! The argument list is split on `-n`/`--new` into one group per note, and
//! each group is parsed on its own. Device and logging options may appear in
//! any group; the last device given wins.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::playback::Note;

const MAX_FREQUENCY_HZ: f32 = 20_000.0;
const MAX_MILLIS: i64 = 300_000;
const MAX_REPEATS: i64 = 1_000_000;
const DEFAULT_DELAY_MS: u32 = 100;

#[derive(Parser, Debug)]
#[command(
    name = "beep",
    version,
    about = "Beep the PC speaker or a PWM buzzer",
    after_help = "Use -n/--new to start another note with its own options."
)]
struct NoteArgs {
    /// Frequency in Hz, 0 to 20000
    #[arg(short = 'f', value_name = "FREQ", default_value_t = 440.0, value_parser = parse_frequency)]
    frequency: f32,

    /// Tone length in milliseconds
    #[arg(short = 'l', value_name = "LENGTH", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(..=MAX_MILLIS))]
    length: u32,

    /// Number of repetitions
    #[arg(short = 'r', value_name = "REPEATS", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..=MAX_REPEATS))]
    repeats: u32,

    /// Delay between repetitions in milliseconds (not after the last one)
    #[arg(short = 'd', value_name = "DELAY",
          value_parser = clap::value_parser!(u32).range(..=MAX_MILLIS))]
    delay: Option<u32>,

    /// Delay after every repetition in milliseconds, including the last one
    #[arg(short = 'D', value_name = "DELAY", conflicts_with = "delay",
          value_parser = clap::value_parser!(u32).range(..=MAX_MILLIS))]
    end_delay: Option<u32>,

    /// Device to use instead of probing the driver defaults
    #[arg(short = 'e', long = "device", value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// More log output; repeat for debug output
    #[arg(long, action = ArgAction::Count)]
    verbose: u8,

    /// Log everything
    #[arg(long)]
    debug: bool,
}

impl NoteArgs {
    fn to_note(&self) -> Note {
        let delay_ms = self.end_delay.or(self.delay).unwrap_or(DEFAULT_DELAY_MS);
        Note {
            // range checked by parse_frequency
            frequency_hz: self.frequency as u16,
            length: Duration::from_millis(u64::from(self.length)),
            repeats: self.repeats,
            delay: Duration::from_millis(u64::from(delay_ms)),
            end_delay: self.end_delay.is_some(),
        }
    }
}

fn parse_frequency(arg: &str) -> Result<f32, String> {
    let frequency: f32 = arg
        .parse()
        .map_err(|_| format!("'{arg}' is not a number"))?;
    if !(0.0..=MAX_FREQUENCY_HZ).contains(&frequency) {
        return Err(format!("frequency must be between 0 and {MAX_FREQUENCY_HZ} Hz"));
    }
    Ok(frequency)
}

#[derive(Debug)]
pub struct Config {
    pub notes: Vec<Note>,
    pub device: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Config {
    /// Parse a full argument list, program name first.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let program = args.next().unwrap_or_else(|| OsString::from("beep"));

        let mut notes = Vec::new();
        let mut device = None;
        let mut verbose = 0u8;
        let mut debug = false;
        for group in split_notes(args) {
            let parsed = NoteArgs::try_parse_from(std::iter::once(program.clone()).chain(group))?;
            notes.push(parsed.to_note());
            if parsed.device.is_some() {
                device = parsed.device;
            }
            verbose = verbose.saturating_add(parsed.verbose);
            debug |= parsed.debug;
        }

        Ok(Self {
            notes,
            device,
            log_level: log_level(verbose, debug),
        })
    }
}

fn split_notes(args: impl Iterator<Item = OsString>) -> Vec<Vec<OsString>> {
    let mut groups = vec![Vec::new()];
    for arg in args {
        if arg.as_os_str() == "-n" || arg.as_os_str() == "--new" {
            groups.push(Vec::new());
        } else if let Some(group) = groups.last_mut() {
            group.push(arg);
        }
    }
    groups
}

fn log_level(verbose: u8, debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::Trace;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::from_args(std::iter::once("beep").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(
            config.notes,
            vec![Note {
                frequency_hz: 440,
                length: Duration::from_millis(200),
                repeats: 1,
                delay: Duration::from_millis(100),
                end_delay: false,
            }]
        );
        assert_eq!(config.device, None);
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_note_options() {
        let config = parse(&["-f", "1000.9", "-l", "50", "-r", "3", "-D", "20"]).unwrap();
        assert_eq!(
            config.notes,
            vec![Note {
                frequency_hz: 1000,
                length: Duration::from_millis(50),
                repeats: 3,
                delay: Duration::from_millis(20),
                end_delay: true,
            }]
        );
    }

    #[test]
    fn test_new_note_groups() {
        let config = parse(&["-f", "300", "-n", "-f", "400", "-d", "0", "--new"]).unwrap();
        let frequencies: Vec<u16> = config.notes.iter().map(|n| n.frequency_hz).collect();
        assert_eq!(frequencies, vec![300, 400, 440]);
        assert_eq!(config.notes[1].delay, Duration::ZERO);
        assert!(!config.notes[1].end_delay);
    }

    #[test]
    fn test_last_device_wins() {
        let config = parse(&["-e", "/dev/tty0", "-n", "--device", "/dev/vc/0", "-n"]).unwrap();
        assert_eq!(config.device, Some(PathBuf::from("/dev/vc/0")));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["--verbose"]).unwrap().log_level, LevelFilter::Info);
        assert_eq!(
            parse(&["--verbose", "-n", "--verbose"]).unwrap().log_level,
            LevelFilter::Debug
        );
        assert_eq!(parse(&["--debug"]).unwrap().log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_zero_frequency_accepted() {
        assert_eq!(parse(&["-f", "0"]).unwrap().notes[0].frequency_hz, 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(parse(&["-f", "20001"]).is_err());
        assert!(parse(&["-f", "-5"]).is_err());
        assert!(parse(&["-f", "loud"]).is_err());
        assert!(parse(&["-r", "0"]).is_err());
        assert!(parse(&["-l", "300001"]).is_err());
    }

    #[test]
    fn test_delay_flags_conflict() {
        assert!(parse(&["-d", "10", "-D", "10"]).is_err());
    }

    #[test]
    fn test_split_notes() {
        let groups = split_notes(["-f", "1", "-n", "-l", "2"].into_iter().map(OsString::from));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1], vec![OsString::from("-l"), OsString::from("2")]);
    }
}
