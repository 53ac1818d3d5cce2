//! Application constants.

// ===== Event loop =====

/// Event poll interval in milliseconds (42ms = ~24 FPS)
pub const EVENT_HANDLER_INTERVAL_MS: u64 = 42;

// ===== Logging =====

/// Maximum number of log entries kept in memory
pub const MAX_LOG_ENTRIES: usize = 500;

/// Number of log lines shown in the log strip
pub const LOG_STRIP_LINES: usize = 3;

/// Log file name used when no path is configured
pub const LOG_FILE_NAME: &str = "claimdesk.log";

// ===== Layout =====

/// Width of the field label column inside a section card
pub const FIELD_LABEL_WIDTH: u16 = 18;

/// Spacing between buttons in modal dialogs
pub const MODAL_BUTTON_SPACING: u16 = 4;
