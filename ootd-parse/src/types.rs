use ootd_core::OptionSet;
use serde::Serialize;

/// Parser output plus what was thrown away, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedReply {
    pub options: OptionSet,
    /// Non-blank lines before the first heading.
    pub preamble_lines: usize,
    /// Non-blank lines inside segments that were not slot lines.
    pub unread_lines: usize,
}

impl ParsedReply {
    pub fn slot_count(&self) -> usize {
        self.options.options().iter().map(|o| o.slots.len()).sum()
    }
}
