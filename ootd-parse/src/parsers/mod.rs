pub mod outfit_reply;
pub mod slot_line;
