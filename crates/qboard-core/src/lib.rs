//! qboard core - group question board
//!
//! The board is two store operations plus a small derived view:
//! - **Submit**: validate a group name and question, stamp it, append one row
//! - **Render**: read every row (through a per-viewer TTL snapshot), drop
//!   blank rows, group by team and order newest-first
//!
//! # Architecture
//!
//! ```text
//! form ─→ SubmissionHandler ─→ SheetStore::append
//!                                   │
//! view ─→ BoardRenderer ─→ SnapshotCache ─→ SheetStore::read_all
//!               │
//!               └─→ Board { GroupView.. }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use qboard_core::{BoardConfig, MemorySheet, QuestionBoard, ViewerId};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemorySheet::with_worksheet("Sheet1"));
//! let board = QuestionBoard::connect(store, BoardConfig::default()).await?;
//!
//! board.submit("Team Diamond", "Why is the sky blue?").await?;
//! let view = board.render(&ViewerId::new()).await?;
//! println!("{} groups", view.groups.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod board;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod submission;
pub mod types;

// Re-exports for convenience
pub use board::{Board, BoardQuestion, BoardRenderer, GroupView, EMPTY_BOARD_MESSAGE};
pub use cache::{CacheOutcome, Snapshot, SnapshotCache, SnapshotKey};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::BoardConfig;
pub use error::{BoardError, StoreError, SubmitError, ValidationError};
pub use service::QuestionBoard;
pub use store::{MemorySheet, SheetStore};
pub use submission::{SubmissionHandler, TrimPolicy};
pub use types::{Ack, Column, QuestionRecord, SheetRow, SubmittedAt, ViewerId, WorksheetId, COLUMNS};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the board
    pub use crate::{
        Board, BoardConfig, BoardError, GroupView, MemorySheet, QuestionBoard, QuestionRecord,
        SheetStore, SubmitError, ViewerId, WorksheetId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
