//! Core types for the OTT bookmark reporter

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Playback lifecycle events reported to the OTT gateway
///
/// Each event maps to a stable wire tag (its upper-cased name). The gateway
/// distinguishes two suppressible categories: the periodic position
/// heartbeat ([`OttEvent::Hit`]) and the milestone "media mark" events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OttEvent {
    /// Periodic position heartbeat
    Hit,
    Play,
    Stop,
    Pause,
    FirstPlay,
    /// Seek completed
    Swoosh,
    Load,
    Finish,
    BitrateChange,
    Error,
}

impl OttEvent {
    /// Wire-level tag sent in the bookmark request
    pub fn wire_tag(&self) -> &'static str {
        match self {
            OttEvent::Hit => "HIT",
            OttEvent::Play => "PLAY",
            OttEvent::Stop => "STOP",
            OttEvent::Pause => "PAUSE",
            OttEvent::FirstPlay => "FIRST_PLAY",
            OttEvent::Swoosh => "SWOOSH",
            OttEvent::Load => "LOAD",
            OttEvent::Finish => "FINISH",
            OttEvent::BitrateChange => "BITRATE_CHANGE",
            OttEvent::Error => "ERROR",
        }
    }

    /// True for the frequent position-heartbeat category
    pub fn is_media_hit(&self) -> bool {
        matches!(self, OttEvent::Hit)
    }

    /// True for the milestone ("media mark") category
    pub fn is_media_mark(&self) -> bool {
        matches!(
            self,
            OttEvent::Play
                | OttEvent::Stop
                | OttEvent::Pause
                | OttEvent::FirstPlay
                | OttEvent::Load
                | OttEvent::Finish
        )
    }
}

impl std::fmt::Display for OttEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_tag())
    }
}

/// Point-in-time view of the host player, read once per build call and
/// discarded
///
/// `position` is `None` when no player is reachable; that is a build
/// precondition failure for every event except stop, which uses the last
/// captured position instead.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    /// Current playback position in seconds, if a player is reachable
    pub position: Option<f64>,
    /// Whether the current media is a live stream
    pub is_live: bool,
    /// String-keyed media metadata
    pub metadata: HashMap<String, String>,
}

impl PlaybackSnapshot {
    /// Typed accessor for a known metadata key; empty values read as absent
    fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn asset_type(&self) -> Option<&str> {
        self.meta("assetType")
    }

    pub fn recording_id(&self) -> Option<&str> {
        self.meta("recordingId")
    }

    pub fn epg_id(&self) -> Option<&str> {
        self.meta("epgId")
    }
}

/// Fully-resolved value set for one bookmark request
///
/// Built fresh per call; carries no hidden identity, so identical inputs
/// produce structurally identical params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportParams {
    /// Upper-cased wire tag of the event
    pub event_tag: String,
    /// Playback position, truncated to whole seconds
    pub current_time: i32,
    /// Asset identity; empty when no identity is known
    pub asset_id: String,
    /// EPG linkage; omitted from the wire when absent
    pub epg_id: Option<String>,
    /// Asset type from media metadata; empty when unknown
    pub asset_type: String,
    /// File identity carried over from the surrounding lifecycle
    pub file_id: String,
}

/// Result of a build call
#[derive(Debug)]
pub enum BuildOutcome {
    /// The suppression gate silenced the event; nothing was constructed
    Suppressed,
    /// A transport-ready request was constructed for asynchronous dispatch
    Sent {
        params: ReportParams,
        request: reqwest::Request,
    },
}

/// Transport-level delivery status of a bookmark round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// The gateway answered; the payload may still carry a business error
    Success,
    /// Transport-level failure; the payload is not inspected
    Failed,
}

/// Parsed response handed back by the transport collaborator
#[derive(Debug, Clone)]
pub struct BookmarkResponse {
    pub status: TransportStatus,
    pub payload: Option<serde_json::Value>,
}

/// Business classification of a delivered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The session is already bound to concurrent playback elsewhere
    ConcurrencyConflict,
    /// Any other application-level error reported by the gateway
    ReportedError { code: String, message: String },
}

/// Follow-up signal emitted to the downstream reporting sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterSignal {
    ConcurrencyConflict,
    BookmarkError { code: String, message: String },
}
