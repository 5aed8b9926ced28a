//! Plays a sequence of notes on the bound driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use beep_core::ActiveDriver;

/// How often a sleeping playback checks for interruption.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub frequency_hz: u16,
    pub length: Duration,
    pub repeats: u32,
    pub delay: Duration,
    /// Also wait `delay` after the last repetition.
    pub end_delay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Interrupted,
}

/// Play `notes` in order. Returns early, with the tone ended, once `stop`
/// is raised.
pub fn play(driver: &mut ActiveDriver<'_>, notes: &[Note], stop: &AtomicBool) -> Outcome {
    for note in notes {
        for repeat in 1..=note.repeats {
            log::debug!(
                "{} Hz for {:?} ({repeat}/{})",
                note.frequency_hz,
                note.length,
                note.repeats
            );
            driver.begin_tone(note.frequency_hz);
            let completed = sleep_unless(stop, note.length);
            driver.end_tone();
            if !completed {
                return Outcome::Interrupted;
            }

            let last = repeat == note.repeats;
            if (!last || note.end_delay) && !sleep_unless(stop, note.delay) {
                return Outcome::Interrupted;
            }
        }
    }
    Outcome::Finished
}

/// Sleep for `duration` in short slices. Returns `false` if `stop` was raised.
fn sleep_unless(stop: &AtomicBool, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(POLL_INTERVAL));
    }
}
