//! SIGINT/SIGTERM handling. Delivery only raises a shared flag; playback
//! polls it between sleeps and silences the speaker itself.

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use signal_hook::consts::{SIGINT, SIGTERM};

/// Register SIGINT and SIGTERM to set the returned flag.
pub fn install() -> io::Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    for signum in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signum, Arc::clone(&interrupted))?;
    }
    Ok(interrupted)
}
