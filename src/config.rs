//! Reporting configuration and derived suppression state
//!
//! Configuration arrives as a whole-value snapshot from the surrounding
//! plugin lifecycle and is never mutated field-by-field. The reporter
//! re-derives its [`Suppression`] flags synchronously on every replacement.

use crate::types::OttEvent;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable reporting configuration snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// OTT gateway base URL
    pub base_url: String,
    /// Numeric partner/account identifier
    pub partner_id: i32,
    /// Session token; empty means "do not report"
    pub ks: String,
    /// Per-session EPG override; wins over media metadata when non-empty
    pub epg_id: Option<String>,
    /// Silence the periodic position-heartbeat events
    pub disable_media_hit: bool,
    /// Silence the milestone (media mark) events
    pub disable_media_mark: bool,
    /// Use the EPG-first identity path for heartbeats on live content
    pub experimental_live_hit: bool,
    /// Heartbeat period
    pub report_interval: Duration,
}

impl ReportingConfig {
    pub fn new(base_url: impl Into<String>, partner_id: i32, ks: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            partner_id,
            ks: ks.into(),
            ..Default::default()
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            partner_id: 0,
            ks: String::new(),
            epg_id: None,
            disable_media_hit: false,
            disable_media_mark: false,
            experimental_live_hit: false,
            report_interval: Duration::from_secs(30),
        }
    }
}

/// Suppression flags derived from a configuration snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Suppression {
    /// Empty session token: nothing is attributable, report nothing
    pub all: bool,
    pub media_hit: bool,
    pub media_mark: bool,
}

impl Suppression {
    /// Recompute the flags from a fresh configuration snapshot
    pub fn derive(config: &ReportingConfig) -> Self {
        Self {
            all: config.ks.is_empty(),
            media_hit: config.disable_media_hit,
            media_mark: config.disable_media_mark,
        }
    }

    /// Whether an event of this type may be reported
    pub fn allows(&self, event: OttEvent) -> bool {
        if self.all {
            return false;
        }
        if event.is_media_hit() && self.media_hit {
            return false;
        }
        if event.is_media_mark() && self.media_mark {
            return false;
        }
        true
    }
}

/// Pure suppression predicate, evaluated fresh against the current snapshot
pub fn should_report(event: OttEvent, config: &ReportingConfig) -> bool {
    Suppression::derive(config).allows(event)
}
