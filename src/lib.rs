//! OTT Bookmark - Playback Analytics Reporter
//!
//! This crate decides whether a player lifecycle event should be reported
//! to an OTT gateway, resolves the bookmark request's fields from layered
//! sources, assembles a transport-ready request, and classifies the
//! gateway's answer into follow-up signals:
//! - Suppression policy per event category (session token, media hit,
//!   media mark flags)
//! - Time and identity resolution with explicit fallback chains
//! - `bookmark/action/add` request assembly
//! - Response classification (silent success, concurrency conflict,
//!   bookmark error)
//! - Player lifecycle mapping and a periodic heartbeat
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     OTT Bookmark Reporter                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  player event ──► ┌─────────────┐    ┌──────────────┐        │
//! │                   │ Suppression │───►│  Resolution  │        │
//! │                   │    Gate     │    │    Chains    │        │
//! │                   └─────────────┘    └──────┬───────┘        │
//! │                                             │                │
//! │                                      ┌──────┴───────┐        │
//! │                                      │   Bookmark   │        │
//! │                                      │   Service    │        │
//! │                                      └──────┬───────┘        │
//! │                                             │ request        │
//! │              ┌──────────────┐        ┌──────┴────────┐       │
//! │   sink ◄─────│  Classifier  │◄───────│   Transport   │       │
//! │              └──────────────┘ reply  │ (collaborator)│       │
//! │                                      └───────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod plugin;
pub mod reporter;
pub mod resolve;
pub mod service;
pub mod types;

pub use classify::{classify, CONCURRENCY_CONFLICT_CODE};
pub use config::{should_report, ReportingConfig, Suppression};
pub use error::{Error, Result};
pub use plugin::{OttAnalyticsPlugin, PlayerNotification, PlayerView, Transport};
pub use reporter::BookmarkReporter;
pub use resolve::ResolvedFrom;
pub use service::BookmarkService;
pub use types::{
    BookmarkResponse, BuildOutcome, OttEvent, Outcome, PlaybackSnapshot, ReportParams,
    ReporterSignal, TransportStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the reporter library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "OTT bookmark reporter initialized");
}
