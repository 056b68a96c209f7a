// shared/src/constants.rs

/// Registry path (under HKLM) that holds one sub-key per Application event source.
pub const EVENT_LOG_REG_KEY: &str = r"SYSTEM\CurrentControlSet\Services\EventLog\Application";

/// Name of the `REG_SZ` value pointing at the message-resource file.
pub const PARAMETER_MESSAGE_FILE_VALUE: &str = "ParameterMessageFile";

/// File name the compiled message resource is installed under.
pub const MESSAGE_FILE_NAME: &str = "eventlog_messages.dll";

/// Source name used when none is configured.
pub const DEFAULT_SOURCE_NAME: &str = "EventLogHandler";

/// Prefix of every handler property, both in TOML files and (upper-cased) in
/// environment variables.
pub const PROPERTY_PREFIX: &str = "eventlog_handler";

// ───── message identifiers ──────────────────────────────────────────────────
// These are baked into messages.mc. Changing one breaks every installed
// message file.

pub const MESSAGE_ID_SUCCESS: u32 = 0x0000_1001;
pub const MESSAGE_ID_INFO: u32 = 0x4000_1002;
pub const MESSAGE_ID_WARNING: u32 = 0x8000_1003;
pub const MESSAGE_ID_ERROR: u32 = 0xC000_1004;

// ───── native limits ────────────────────────────────────────────────────────

/// Longest insertion string `ReportEventW` accepts, in UTF-16 units.
pub const MAX_EVENT_STRING_UNITS: usize = 31_839;

/// Largest binary payload attached to a single event, in bytes.
pub const MAX_EVENT_DATA_BYTES: usize = 61_440;
