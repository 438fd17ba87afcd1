//! Board configuration

use crate::submission::TrimPolicy;
use crate::types::WorksheetId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Worksheet holding the question rows
    pub worksheet: WorksheetId,
    /// Maximum age of a viewer's read snapshot, in seconds
    pub freshness_secs: u64,
    /// Maximum number of cached viewer snapshots
    pub cache_capacity: u64,
    /// Whitespace handling for submitted fields
    pub trim: TrimPolicy,
    /// Keep typed input in the form when the append fails
    pub restore_input_on_failure: bool,
}

impl BoardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With worksheet
    #[inline]
    #[must_use]
    pub fn with_worksheet(mut self, worksheet: impl Into<WorksheetId>) -> Self {
        self.worksheet = worksheet.into();
        self
    }

    /// With snapshot freshness window
    #[inline]
    #[must_use]
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness_secs = freshness.as_secs();
        self
    }

    /// With trim policy
    #[inline]
    #[must_use]
    pub fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }

    /// Freshness window as a duration
    #[inline]
    #[must_use]
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            worksheet: WorksheetId::default(),
            freshness_secs: 5,
            cache_capacity: 10_000,
            trim: TrimPolicy::default(),
            restore_input_on_failure: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_board_contract() {
        let config = BoardConfig::default();
        assert_eq!(config.worksheet.as_str(), "Sheet1");
        assert_eq!(config.freshness(), Duration::from_secs(5));
        assert_eq!(config.trim, TrimPolicy::Trim);
    }

    #[test]
    fn builder_overrides() {
        let config = BoardConfig::new()
            .with_worksheet("Questions")
            .with_freshness(Duration::from_secs(30))
            .with_trim(TrimPolicy::Preserve);
        assert_eq!(config.worksheet.as_str(), "Questions");
        assert_eq!(config.freshness_secs, 30);
        assert_eq!(config.trim, TrimPolicy::Preserve);
    }
}
