//! Utility functions

mod format;
pub mod tui_log;

pub use format::format_date;
pub use tui_log::{set_tui_mode, ConditionalStderrLayer};
