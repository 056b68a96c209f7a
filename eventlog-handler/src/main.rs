// src/main.rs

//! Demo entry-point: route `log` records to stdout and the event log.
//!
//! 1. Load handler properties (`argv[1]`, else `eventlog.toml` beside the exe)
//! 2. Point the process at the message file shipped next to the executable
//! 3. Build the handler and chain it into a `fern` dispatch
//! 4. Emit one record per severity
//! 5. Close the handler (deregister, optionally delete the registry key)

// ───── std / 3rd-party imports ──────────────────────────────────────────────
use anyhow::Context;
use chrono::Local;
use fern::Dispatch;
use std::{
    path::{Path, PathBuf},
    process,
    sync::Arc,
    thread,
};

// ───── local imports ────────────────────────────────────────────────────────
use eventlog_handler::{
    EventLogHandler, LogRecord, LoggingProperties, Severity, SharedHandler, message_file,
};
use shared::MESSAGE_FILE_NAME;

/// Directory that contains the running executable.
fn exe_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot determine exe path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Executable must live in some directory")
}

/// Load handler properties, or none when the file does not exist.
fn load_properties(path: &Path) -> anyhow::Result<LoggingProperties> {
    if !path.exists() {
        eprintln!(
            "[{}][WARN][config] {} not found, using defaults",
            Local::now().to_rfc3339(),
            path.display()
        );
        return Ok(LoggingProperties::new());
    }
    LoggingProperties::load(path).with_context(|| format!("loading {}", path.display()))
}

/// stdout gets formatted lines; the event log gets the bare message.
fn setup_logging(handler: &Arc<EventLogHandler>) -> Result<(), fern::InitError> {
    let console = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .chain(std::io::stdout());

    Dispatch::new()
        .level(log::LevelFilter::Trace)
        .chain(console)
        .chain(Box::new(SharedHandler(Arc::clone(handler))) as Box<dyn log::Log>)
        .apply()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // 1 ─ Context
    let exe_dir = exe_dir()?;
    let props_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| exe_dir.join("eventlog.toml"));
    let props = load_properties(&props_path)?;

    // 2 ─ Message file
    message_file::init(exe_dir.join(MESSAGE_FILE_NAME));

    // 3 ─ Handler + logging
    let handler = Arc::new(EventLogHandler::builder().properties(props).build());
    setup_logging(&handler)?;
    log::info!(
        "Publishing to source '{}' (message file {}, registration {:?})",
        handler.config().source_name,
        handler.message_file().display(),
        handler.registration()
    );

    // 4 ─ One record per severity, through `log` and directly
    log::error!("demo error record");
    log::warn!("demo warning record");
    log::debug!("demo debug record (below the default threshold)");
    for level in Severity::ALL_LEVELS {
        let record = LogRecord::new(level, "Demo record at {0}")
            .with_parameters([level.name()])
            .with_logger_name("eventlog-demo");
        if handler.is_loggable(&record) {
            handler.publish(&record);
        }
    }

    // 5 ─ Shutdown
    handler.close();
    println!("Done. Check Event Viewer > Windows Logs > Application.");
    Ok(())
}
