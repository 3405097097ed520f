//! Request log and activity reporting.
//!
//! Every gateway request is appended to `~/.orgdash/requests.jsonl`
//! ([`logger`]); `orgdash activity` summarizes it ([`reporter`]).

pub mod logger;
pub mod reporter;
