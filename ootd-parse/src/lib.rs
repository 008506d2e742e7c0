//! ootd-parse: read typed outfit options back out of free-text model replies.
//!
//! The model is asked for a strict layout but nothing enforces it, so every
//! parser here is total: any input yields a (possibly empty) result.
//!
//! Reply grammar, informally:
//!
//! ```text
//! reply    := preamble { heading segment }
//! heading  := "OUTFIT" ws "OPTION" ws? "#"? digits ws? ":"?      case-insensitive, anywhere
//! segment  := { line }
//! line     := slot-line | other
//! slot-line:= bullet? emphasis? label emphasis? ":" emphasis? value
//! bullet   := any run of whitespace, "-", "*", "•", ">", or "<digits>." / "<digits>)"
//! label    := letter { letter | mark | digit | space | "&" | "/" | "'" | "-" }
//!             any script; "(...)" asides dropped first; at most 40 chars
//!             and 5 words, else the last word when the value is an item
//! value    := "Item" ws? "#"? digits note | text
//! ```
//!
//! The preamble is discarded. A segment whose lines are all `other` is an
//! empty option, not a dropped one. Slot lines with an empty value are
//! skipped so every slot carries an item reference or a suggestion.

pub mod parsers;
pub mod types;

pub use parsers::outfit_reply::{parse_outfit_reply, parse_outfit_reply_detailed};
pub use parsers::slot_line::parse_slot_line;
pub use types::ParsedReply;
