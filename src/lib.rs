//! orgdash: employer wellness analytics from the terminal.
//!
//! The library holds everything the binary drives: persisted session
//! storage, the API gateway client, the session manager and the
//! fetch-and-normalize pipeline behind each dashboard view.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod probe;
pub mod session;
pub mod storage;
