// src/message_file.rs

//! Location of the compiled message-resource file.
//!
//! The path is process-wide and set at most once. Call [`init`] (or
//! [`install`] when the resource is embedded in the binary) during start-up,
//! before the first handler is built. Nothing needs tearing down: the file is
//! only ever read by the event viewer.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use shared::MESSAGE_FILE_NAME;

static MESSAGE_FILE: OnceLock<PathBuf> = OnceLock::new();

/// Record the message file path. The first call wins; later calls return the
/// path that is already set.
pub fn init(path: impl Into<PathBuf>) -> &'static Path {
    let candidate = path.into();
    MESSAGE_FILE
        .get_or_init(|| std::path::absolute(&candidate).unwrap_or(candidate))
        .as_path()
}

/// The initialized path, if any.
pub fn get() -> Option<&'static Path> {
    MESSAGE_FILE.get().map(PathBuf::as_path)
}

/// Write `bytes` to `dir/eventlog_messages.dll` and [`init`] that path.
///
/// The file is left alone when it already exists with the same length, so
/// concurrent processes installing the same resource do not rewrite it.
pub fn install(bytes: &[u8], dir: &Path) -> io::Result<&'static Path> {
    let target = write_resource(bytes, dir)?;
    Ok(init(target))
}

/// File-writing half of [`install`], without touching the global.
pub fn write_resource(bytes: &[u8], dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(MESSAGE_FILE_NAME);
    let up_to_date = fs::metadata(&target)
        .map(|meta| meta.is_file() && meta.len() == bytes.len() as u64)
        .unwrap_or(false);
    if !up_to_date {
        // write-then-rename so a reader never sees a partial file
        let tmp = target.with_extension("dll.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &target)?;
    }
    Ok(std::path::absolute(&target).unwrap_or(target))
}

/// Path written to the registry for one handler: its own override, else the
/// process-wide path, else the file next to the executable.
pub fn resolve(override_path: Option<&Path>) -> PathBuf {
    let chosen = match override_path {
        Some(path) => path.to_path_buf(),
        None => match get() {
            Some(path) => path.to_path_buf(),
            None => default_path(),
        },
    };
    std::path::absolute(&chosen).unwrap_or(chosen)
}

/// `<exe dir>/eventlog_messages.dll`, or the bare file name when the
/// executable path is unknown.
pub fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map(|dir| dir.join(MESSAGE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(MESSAGE_FILE_NAME))
}
