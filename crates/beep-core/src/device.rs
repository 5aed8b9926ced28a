//! Opening device nodes and pseudo-files.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

/// Open `path` write-only and make sure it is a character device.
///
/// The handle is closed again (dropped) when the check fails.
pub fn open_checked_char_device(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new().write(true).open(path)?;
    let file_type = file.metadata()?.file_type();
    if !file_type.is_char_device() {
        log::debug!("{} is not a character device", path.display());
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a character device", path.display()),
        ));
    }
    Ok(file)
}

/// Open an existing file write-only. Never creates it.
pub fn open_writable(path: &Path) -> io::Result<File> {
    log::debug!("checking device {}", path.display());
    OpenOptions::new().write(true).open(path)
}
