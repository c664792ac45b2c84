//! Terminal browser for S3-compatible object storage.
//!
//! [`app::App`] is the navigation state machine; [`protocol`] carries the
//! messages and background commands that drive it; [`tui`] owns the
//! terminal and renders the state.

pub mod app;
pub mod aws;
pub mod cli;
pub mod filter;
pub mod list;
pub mod logging;
pub mod protocol;
pub mod store;
pub mod tui;
pub mod viewport;
