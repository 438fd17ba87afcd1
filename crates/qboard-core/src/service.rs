//! Question board service
//!
//! Owns the store handle and wires it into the submission handler and the
//! renderer. Constructed once at startup; a store that fails the startup
//! probe never produces a board.

use crate::board::{Board, BoardRenderer};
use crate::cache::SnapshotCache;
use crate::clock::{Clock, LocalClock};
use crate::config::BoardConfig;
use crate::error::{BoardError, SubmitError};
use crate::store::SheetStore;
use crate::submission::SubmissionHandler;
use crate::types::{Ack, ViewerId};
use std::sync::Arc;

/// The board: submissions in, grouped views out
#[derive(Debug, Clone)]
pub struct QuestionBoard {
    config: BoardConfig,
    store: Arc<dyn SheetStore>,
    submissions: SubmissionHandler,
    renderer: BoardRenderer,
}

impl QuestionBoard {
    /// Probe the store and build the board using the local clock
    ///
    /// # Errors
    /// `BoardError::ConnectionFault` when the store or worksheet is unusable.
    pub async fn connect(store: Arc<dyn SheetStore>, config: BoardConfig) -> Result<Self, BoardError> {
        Self::connect_with_clock(store, config, Arc::new(LocalClock)).await
    }

    /// Probe the store and build the board with an explicit clock
    pub async fn connect_with_clock(
        store: Arc<dyn SheetStore>,
        config: BoardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BoardError> {
        tracing::info!(
            backend = store.backend_tag(),
            worksheet = %config.worksheet,
            "Connecting to question store"
        );

        store.probe(&config.worksheet).await.map_err(|err| {
            tracing::error!(backend = store.backend_tag(), code = err.code(), "Store probe failed: {}", err);
            BoardError::ConnectionFault(err)
        })?;

        let cache = SnapshotCache::new(config.cache_capacity, config.freshness());
        let submissions = SubmissionHandler::new(
            Arc::clone(&store),
            clock,
            config.worksheet.clone(),
            config.trim,
        );
        let renderer = BoardRenderer::new(Arc::clone(&store), cache, config.worksheet.clone());

        Ok(Self {
            config,
            store,
            submissions,
            renderer,
        })
    }

    /// Submit one question
    pub async fn submit(&self, group: &str, text: &str) -> Result<Ack, SubmitError> {
        self.submissions.submit(group, text).await
    }

    /// Render the board for a viewer
    pub async fn render(&self, viewer: &ViewerId) -> Result<Board, BoardError> {
        self.renderer.render(viewer).await
    }

    /// Board configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Backend tag of the underlying store
    #[inline]
    #[must_use]
    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    /// Release cached snapshots
    pub fn close(self) {
        self.renderer.cache().invalidate_all();
        tracing::info!(backend = self.store.backend_tag(), "Question board closed");
    }
}
