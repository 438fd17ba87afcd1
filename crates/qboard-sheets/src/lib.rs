//! qboard Sheets backend
//!
//! Implements [`qboard_core::SheetStore`] over the Google Sheets v4 REST API.
//! Row 1 of the worksheet is the header (`group | text | submitted_at`),
//! written at startup when the row is empty; data is read from row 2 down
//! and appended as whole rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use qboard_sheets::{SheetsConfig, SheetsStore};
//!
//! let config = SheetsConfig::new("1AbC...").with_token_file("/run/secrets/token");
//! let store = SheetsStore::from_config(&config)?;
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
pub mod range;

pub use client::SheetsStore;
pub use config::{SheetsConfig, DEFAULT_BASE_URL};
pub use error::{SheetsError, BACKEND};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
