//! OTT analytics plugin - player lifecycle wiring
//!
//! Translates raw player notifications into gateway events, keeps the
//! reporter's last-position capture fed, and runs the periodic heartbeat
//! while content is playing. The reporter itself stays free of player and
//! transport concerns; this module owns those seams.

use crate::reporter::BookmarkReporter;
use crate::types::{BookmarkResponse, BuildOutcome, PlaybackSnapshot};
use crate::OttEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Read-only view of the host player
pub trait PlayerView: Send + Sync {
    /// Current playback position in seconds; `None` when unreachable
    fn position(&self) -> Option<f64>;
    /// Whether the current media is a live stream
    fn is_live(&self) -> bool;
    /// Current media metadata mapping
    fn metadata(&self) -> HashMap<String, String>;
}

impl PlaybackSnapshot {
    /// Read the player once; the snapshot is discarded after the build
    pub fn capture(player: &dyn PlayerView) -> Self {
        Self {
            position: player.position(),
            is_live: player.is_live(),
            metadata: player.metadata(),
        }
    }
}

/// Dispatches an assembled request and hands back the parsed response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, request: reqwest::Request) -> BookmarkResponse;
}

/// Raw notifications from the host player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerNotification {
    Play,
    Pause,
    /// Seek completed
    Seeked,
    /// Content reached its end
    Ended,
    /// Playback was stopped explicitly
    Stopped,
    /// Playhead moved
    PositionUpdate(f64),
}

/// Analytics plugin binding a reporter to a player and a transport
pub struct OttAnalyticsPlugin {
    reporter: Arc<BookmarkReporter>,
    player: Arc<dyn PlayerView>,
    transport: Arc<dyn Transport>,
    first_play_sent: AtomicBool,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl OttAnalyticsPlugin {
    pub fn new(
        reporter: Arc<BookmarkReporter>,
        player: Arc<dyn PlayerView>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            reporter,
            player,
            transport,
            first_play_sent: AtomicBool::new(false),
            heartbeat: Mutex::new(None),
        }
    }

    /// Handle one player notification
    pub async fn on_notification(&self, notification: PlayerNotification) {
        match notification {
            PlayerNotification::Play => {
                let event = if self.first_play_sent.swap(true, Ordering::SeqCst) {
                    OttEvent::Play
                } else {
                    OttEvent::FirstPlay
                };
                self.report(event).await;
                self.start_heartbeat();
            }
            PlayerNotification::Pause => {
                self.stop_heartbeat();
                self.report(OttEvent::Pause).await;
            }
            PlayerNotification::Seeked => {
                self.report(OttEvent::Swoosh).await;
            }
            PlayerNotification::Ended => {
                self.stop_heartbeat();
                self.report(OttEvent::Finish).await;
                self.report(OttEvent::Stop).await;
            }
            PlayerNotification::Stopped => {
                self.stop_heartbeat();
                self.report(OttEvent::Stop).await;
            }
            PlayerNotification::PositionUpdate(position) => {
                self.reporter.note_position(position);
            }
        }
    }

    /// Build and dispatch one event, then feed the response back
    async fn report(&self, event: OttEvent) {
        report_once(&self.reporter, &*self.player, &*self.transport, event).await;
    }

    /// Start the periodic heartbeat; replaces any previous one
    fn start_heartbeat(&self) {
        let reporter = Arc::clone(&self.reporter);
        let player = Arc::clone(&self.player);
        let transport = Arc::clone(&self.transport);
        let interval = reporter.report_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The immediate first tick would double-report the play event
            ticker.tick().await;
            loop {
                ticker.tick().await;
                report_once(&reporter, &*player, &*transport, OttEvent::Hit).await;
            }
        });

        let mut heartbeat = self.heartbeat.lock().unwrap();
        if let Some(previous) = heartbeat.replace(handle) {
            previous.abort();
        }
        debug!(interval_secs = interval.as_secs(), "Heartbeat started");
    }

    fn stop_heartbeat(&self) {
        if let Some(handle) = self.heartbeat.lock().unwrap().take() {
            handle.abort();
            debug!("Heartbeat stopped");
        }
    }
}

impl Drop for OttAnalyticsPlugin {
    fn drop(&mut self) {
        self.stop_heartbeat();
    }
}

async fn report_once(
    reporter: &BookmarkReporter,
    player: &dyn PlayerView,
    transport: &dyn Transport,
    event: OttEvent,
) {
    let snapshot = PlaybackSnapshot::capture(player);
    match reporter.build_report(event, &snapshot) {
        Ok(BuildOutcome::Suppressed) => {}
        Ok(BuildOutcome::Sent { request, .. }) => {
            let response = transport.dispatch(request).await;
            reporter.handle_response(&response);
        }
        Err(e) => {
            error!(event = %event, code = e.error_code(), "Bookmark build failed: {e}");
            if matches!(e, crate::Error::NoPlayerAvailable) {
                warn!("No associated player, event dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportingConfig;
    use crate::types::TransportStatus;
    use serde_json::json;

    struct FakePlayer {
        position: Mutex<Option<f64>>,
        metadata: HashMap<String, String>,
    }

    impl FakePlayer {
        fn at(position: f64) -> Self {
            Self {
                position: Mutex::new(Some(position)),
                metadata: HashMap::from([("recordingId".to_string(), "R1".to_string())]),
            }
        }
    }

    impl PlayerView for FakePlayer {
        fn position(&self) -> Option<f64> {
            *self.position.lock().unwrap()
        }
        fn is_live(&self) -> bool {
            false
        }
        fn metadata(&self) -> HashMap<String, String> {
            self.metadata.clone()
        }
    }

    /// Records dispatched event tags and answers with a clean response
    struct RecordingTransport {
        dispatched: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                dispatched: Mutex::new(Vec::new()),
            }
        }

        fn actions(&self) -> Vec<String> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn dispatch(&self, request: reqwest::Request) -> BookmarkResponse {
            let body = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
            let json: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
            let action = json["bookmark"]["playerData"]["action"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            self.dispatched.lock().unwrap().push(action);
            BookmarkResponse {
                status: TransportStatus::Success,
                payload: Some(json!({"result": {}})),
            }
        }
    }

    fn plugin(transport: Arc<RecordingTransport>) -> OttAnalyticsPlugin {
        let config = ReportingConfig::new("https://gateway.example.com/api_v3", 147, "test-ks");
        let (reporter, _rx) = BookmarkReporter::new(config);
        OttAnalyticsPlugin::new(
            Arc::new(reporter),
            Arc::new(FakePlayer::at(12.0)),
            transport,
        )
    }

    #[tokio::test]
    async fn test_first_play_then_play() {
        let transport = Arc::new(RecordingTransport::new());
        let plugin = plugin(Arc::clone(&transport));

        plugin.on_notification(PlayerNotification::Play).await;
        plugin.on_notification(PlayerNotification::Pause).await;
        plugin.on_notification(PlayerNotification::Play).await;

        assert_eq!(transport.actions(), vec!["FIRST_PLAY", "PAUSE", "PLAY"]);
    }

    #[tokio::test]
    async fn test_ended_emits_finish_then_stop() {
        let transport = Arc::new(RecordingTransport::new());
        let plugin = plugin(Arc::clone(&transport));

        plugin
            .on_notification(PlayerNotification::PositionUpdate(12.0))
            .await;
        plugin.on_notification(PlayerNotification::Ended).await;

        assert_eq!(transport.actions(), vec!["FINISH", "STOP"]);
    }

    #[tokio::test]
    async fn test_seeked_maps_to_swoosh() {
        let transport = Arc::new(RecordingTransport::new());
        let plugin = plugin(Arc::clone(&transport));

        plugin.on_notification(PlayerNotification::Seeked).await;

        assert_eq!(transport.actions(), vec!["SWOOSH"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_emits_hits_while_playing() {
        let transport = Arc::new(RecordingTransport::new());
        let plugin = plugin(Arc::clone(&transport));

        plugin.on_notification(PlayerNotification::Play).await;
        // Let the heartbeat task register its timer before advancing
        tokio::task::yield_now().await;
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        plugin.on_notification(PlayerNotification::Stopped).await;

        let actions = transport.actions();
        assert_eq!(actions.first().map(String::as_str), Some("FIRST_PLAY"));
        assert_eq!(actions.last().map(String::as_str), Some("STOP"));
        assert!(
            actions.iter().filter(|a| *a == "HIT").count() >= 1,
            "expected at least one heartbeat, got {actions:?}"
        );
    }

    #[tokio::test]
    async fn test_stop_without_player_uses_captured_position() {
        let transport = Arc::new(RecordingTransport::new());
        let config = ReportingConfig::new("https://gateway.example.com/api_v3", 147, "test-ks");
        let (reporter, _rx) = BookmarkReporter::new(config);
        let player = Arc::new(FakePlayer::at(0.0));
        *player.position.lock().unwrap() = None; // player torn down

        let plugin =
            OttAnalyticsPlugin::new(Arc::new(reporter), player, transport.clone());

        plugin
            .on_notification(PlayerNotification::PositionUpdate(88.0))
            .await;
        plugin.on_notification(PlayerNotification::Stopped).await;

        assert_eq!(transport.actions(), vec!["STOP"]);
    }
}
