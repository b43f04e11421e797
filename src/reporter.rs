//! Bookmark reporter - the decision-and-construction pipeline
//!
//! One build call runs: suppression gate -> time resolution -> identity
//! fallback chains -> request assembly. The response comes back later on
//! the transport's delivery context and is classified into at most one
//! follow-up signal for the downstream sink.

use crate::classify::classify;
use crate::config::{ReportingConfig, Suppression};
use crate::error::Result;
use crate::resolve::{
    resolve_asset_id, resolve_asset_type, resolve_epg_id, resolve_file_id, resolve_live_asset_id,
    resolve_time,
};
use crate::service::BookmarkService;
use crate::types::{
    BookmarkResponse, BuildOutcome, Outcome, PlaybackSnapshot, ReportParams, ReporterSignal,
    TransportStatus,
};
use crate::OttEvent;
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration snapshot plus the suppression flags derived from it,
/// swapped as one value so readers never see a half-applied update
#[derive(Debug)]
struct ConfigState {
    config: ReportingConfig,
    suppression: Suppression,
}

/// Identity values carried across build calls
///
/// Written synchronously before any asynchronous work begins; last writer
/// wins when multiple events are in flight.
#[derive(Debug, Default)]
struct CarriedIdentity {
    media_id: Option<String>,
    file_id: Option<String>,
    last_position: f64,
}

/// Playback analytics reporter for the OTT gateway
///
/// Holds no long-lived mutable state beyond the configuration snapshot and
/// the carried identity cell; every [`ReportParams`] is a fresh, unshared
/// value.
pub struct BookmarkReporter {
    state: RwLock<ConfigState>,
    carried: Mutex<CarriedIdentity>,
    service: BookmarkService,
    sink: mpsc::UnboundedSender<ReporterSignal>,
}

impl BookmarkReporter {
    /// Create a reporter and the sink channel its follow-up signals arrive on
    pub fn new(config: ReportingConfig) -> (Self, mpsc::UnboundedReceiver<ReporterSignal>) {
        let (sink, receiver) = mpsc::unbounded_channel();
        let suppression = Suppression::derive(&config);
        let reporter = Self {
            state: RwLock::new(ConfigState { config, suppression }),
            carried: Mutex::new(CarriedIdentity::default()),
            service: BookmarkService::new(),
            sink,
        };
        (reporter, receiver)
    }

    /// Atomically replace the configuration snapshot
    ///
    /// Derived suppression flags are recomputed before this returns; the
    /// next build call sees the new snapshot in full.
    pub fn apply_config(&self, config: ReportingConfig) {
        let suppression = Suppression::derive(&config);
        let mut state = self.state.write().unwrap();
        debug!(
            partner_id = config.partner_id,
            suppress_all = suppression.all,
            "Reporting configuration replaced"
        );
        *state = ConfigState { config, suppression };
    }

    /// Current heartbeat period
    pub fn report_interval(&self) -> Duration {
        self.state.read().unwrap().config.report_interval
    }

    /// Capture the playhead so a later stop event can report the position
    /// playback actually ended at
    pub fn note_position(&self, position: f64) {
        self.carried.lock().unwrap().last_position = position;
    }

    /// Seed the carried asset identity (set on media load)
    pub fn set_media_id(&self, media_id: impl Into<String>) {
        self.carried.lock().unwrap().media_id = Some(media_id.into());
    }

    /// Seed the carried file identity (set on source selection)
    pub fn set_file_id(&self, file_id: impl Into<String>) {
        self.carried.lock().unwrap().file_id = Some(file_id.into());
    }

    /// Build a bookmark request for one lifecycle event
    ///
    /// Returns [`BuildOutcome::Suppressed`] synchronously when the gate
    /// silences the event. Errors abort the build; nothing is sent and
    /// nothing is retried here.
    pub fn build_report(&self, event: OttEvent, snapshot: &PlaybackSnapshot) -> Result<BuildOutcome> {
        let (config, suppression) = {
            let state = self.state.read().unwrap();
            (state.config.clone(), state.suppression)
        };

        if !suppression.allows(event) {
            debug!(event = %event, "Bookmark not sent, event suppressed");
            return Ok(BuildOutcome::Suppressed);
        }

        // Resolve time and update the carried cell under one lock so the
        // identity write lands before any asynchronous work.
        let (current_time, asset_id, file_id) = {
            let mut carried = self.carried.lock().unwrap();
            let current_time = resolve_time(event, snapshot.position, carried.last_position)?;

            if let Some(recording_id) = snapshot.recording_id() {
                carried.media_id = Some(recording_id.to_string());
            }

            let epg_first =
                config.experimental_live_hit && event.is_media_hit() && snapshot.is_live;
            let (asset_id, _) = if epg_first {
                resolve_live_asset_id(
                    resolve_epg_id(config.epg_id.as_deref(), snapshot.epg_id())
                        .as_ref()
                        .map(|(id, _)| id.as_str()),
                    snapshot.recording_id(),
                    carried.media_id.as_deref(),
                )
            } else {
                resolve_asset_id(snapshot.recording_id(), carried.media_id.as_deref())
            };

            let file_id = resolve_file_id(carried.file_id.as_deref());
            (current_time, asset_id, file_id)
        };

        let (asset_type, _) = resolve_asset_type(snapshot.asset_type());
        let epg_id = resolve_epg_id(config.epg_id.as_deref(), snapshot.epg_id()).map(|(id, _)| id);

        let params = ReportParams {
            event_tag: event.wire_tag().to_string(),
            current_time,
            asset_id,
            epg_id,
            asset_type,
            file_id,
        };

        let request = self.service.action_add(&config, &params)?;

        info!(
            event = %event,
            position = params.current_time,
            asset_id = %params.asset_id,
            "Bookmark request built"
        );

        Ok(BuildOutcome::Sent { params, request })
    }

    /// Handle a response delivered by the transport collaborator
    ///
    /// Safe to call from the transport's own delivery context. Transport
    /// failures are logged and dropped; business conditions are forwarded
    /// to the sink. Returns the classification, if any, for the caller.
    pub fn handle_response(&self, response: &BookmarkResponse) -> Option<Outcome> {
        if response.status == TransportStatus::Failed {
            warn!("Bookmark transport failed, response not classified");
            return None;
        }

        let outcome = response.payload.as_ref().and_then(classify)?;

        let signal = match &outcome {
            Outcome::ConcurrencyConflict => {
                info!("Concurrency conflict reported by gateway");
                ReporterSignal::ConcurrencyConflict
            }
            Outcome::ReportedError { code, message } => {
                warn!(code = %code, message = %message, "Bookmark error reported by gateway");
                ReporterSignal::BookmarkError {
                    code: code.clone(),
                    message: message.clone(),
                }
            }
        };

        // A closed sink only means no one is listening anymore.
        let _ = self.sink.send(signal);

        Some(outcome)
    }
}
