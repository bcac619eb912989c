//! `abroad` - Form and record browser for study- and internship-abroad reports
//!
//! This library loads a shared SQLite database of experience reports, builds
//! filtered listings of it, renders them as HTML or plain text, and validates
//! and stores submitted entry forms.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod query;
pub mod record;
pub mod render;
pub mod session;
pub mod storage;
pub mod suggest;
pub mod transfer;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use session::Session;
pub use storage::{Storage, StorageStats};
