//! Field-resolution fallback chains
//!
//! Every bookmark field is resolved by one pure function that takes all
//! candidate sources as explicit parameters and returns the resolved value
//! together with the source that won. Keeping each chain in one place makes
//! the precedence rules testable without a player or a gateway.

use crate::error::{Error, Result};
use crate::types::OttEvent;

/// Which candidate source produced a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// Explicit configuration override
    ConfigOverride,
    /// Media metadata key
    Metadata,
    /// Value carried over from earlier lifecycle events
    CarryOver,
    /// No source had a value; the documented default applies
    Default,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolve the position to report for an event
///
/// The stop event uses the last position captured when playback ended; the
/// player may already be torn down or moved past the stop point by the time
/// the request is built. Every other event needs a live read and fails the
/// whole build when no player is reachable, because a stale or zero time
/// would corrupt analytics. Fractional seconds truncate.
pub fn resolve_time(event: OttEvent, live_position: Option<f64>, last_position: f64) -> Result<i32> {
    if event == OttEvent::Stop {
        return Ok(last_position as i32);
    }
    match live_position {
        Some(position) => Ok(position as i32),
        None => Err(Error::NoPlayerAvailable),
    }
}

/// Resolve the asset type from media metadata; defaults to empty
pub fn resolve_asset_type(metadata: Option<&str>) -> (String, ResolvedFrom) {
    match non_empty(metadata) {
        Some(value) => (value.to_string(), ResolvedFrom::Metadata),
        None => (String::new(), ResolvedFrom::Default),
    }
}

/// Resolve the asset identity
///
/// A `recordingId` in media metadata overrides any carried asset id;
/// otherwise the carried id (set by prior lifecycle events or initial load)
/// is kept. Defaults to empty when no identity is known.
pub fn resolve_asset_id(recording_id: Option<&str>, carried: Option<&str>) -> (String, ResolvedFrom) {
    if let Some(id) = non_empty(recording_id) {
        return (id.to_string(), ResolvedFrom::Metadata);
    }
    match non_empty(carried) {
        Some(id) => (id.to_string(), ResolvedFrom::CarryOver),
        None => (String::new(), ResolvedFrom::Default),
    }
}

/// Resolve the asset identity for heartbeats on live content
///
/// Live sessions are addressed by programme rather than by recording, so the
/// EPG identity wins when one is known; otherwise the normal chain applies.
pub fn resolve_live_asset_id(
    epg_id: Option<&str>,
    recording_id: Option<&str>,
    carried: Option<&str>,
) -> (String, ResolvedFrom) {
    if let Some(id) = non_empty(epg_id) {
        return (id.to_string(), ResolvedFrom::Metadata);
    }
    resolve_asset_id(recording_id, carried)
}

/// Resolve the EPG linkage
///
/// An explicit per-session override wins over content metadata so operators
/// can correct EPG linkage without re-tagging media. Absent unless a source
/// produced a non-empty value.
pub fn resolve_epg_id(
    config_override: Option<&str>,
    metadata: Option<&str>,
) -> Option<(String, ResolvedFrom)> {
    if let Some(id) = non_empty(config_override) {
        return Some((id.to_string(), ResolvedFrom::ConfigOverride));
    }
    non_empty(metadata).map(|id| (id.to_string(), ResolvedFrom::Metadata))
}

/// Resolve the file identity; carry-over only, defaults to empty
pub fn resolve_file_id(carried: Option<&str>) -> String {
    non_empty(carried).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_uses_last_position_over_live() {
        // Live position differs; stop must still report the captured one
        let time = resolve_time(OttEvent::Stop, Some(99.9), 42.7).unwrap();
        assert_eq!(time, 42);
    }

    #[test]
    fn test_stop_without_player_still_resolves() {
        let time = resolve_time(OttEvent::Stop, None, 17.0).unwrap();
        assert_eq!(time, 17);
    }

    #[test]
    fn test_non_stop_requires_live_position() {
        let err = resolve_time(OttEvent::Play, None, 42.0).unwrap_err();
        assert!(matches!(err, Error::NoPlayerAvailable));
    }

    #[test]
    fn test_live_position_truncates() {
        let time = resolve_time(OttEvent::Hit, Some(12.999), 0.0).unwrap();
        assert_eq!(time, 12);
    }

    #[test]
    fn test_recording_id_overrides_carried_asset_id() {
        let (id, from) = resolve_asset_id(Some("R1"), Some("R0"));
        assert_eq!(id, "R1");
        assert_eq!(from, ResolvedFrom::Metadata);
    }

    #[test]
    fn test_carried_asset_id_kept_without_metadata() {
        let (id, from) = resolve_asset_id(None, Some("R0"));
        assert_eq!(id, "R0");
        assert_eq!(from, ResolvedFrom::CarryOver);

        let (id, from) = resolve_asset_id(Some(""), Some("R0"));
        assert_eq!(id, "R0");
        assert_eq!(from, ResolvedFrom::CarryOver);
    }

    #[test]
    fn test_asset_id_defaults_to_empty() {
        let (id, from) = resolve_asset_id(None, None);
        assert_eq!(id, "");
        assert_eq!(from, ResolvedFrom::Default);
    }

    #[test]
    fn test_epg_override_wins() {
        let (id, from) = resolve_epg_id(Some("E-override"), Some("E-meta")).unwrap();
        assert_eq!(id, "E-override");
        assert_eq!(from, ResolvedFrom::ConfigOverride);
    }

    #[test]
    fn test_empty_epg_override_falls_through_to_metadata() {
        let (id, from) = resolve_epg_id(Some(""), Some("E-meta")).unwrap();
        assert_eq!(id, "E-meta");
        assert_eq!(from, ResolvedFrom::Metadata);
    }

    #[test]
    fn test_epg_absent_when_no_source() {
        assert!(resolve_epg_id(None, None).is_none());
        assert!(resolve_epg_id(Some(""), Some("")).is_none());
    }

    #[test]
    fn test_live_asset_id_prefers_epg() {
        let (id, from) = resolve_live_asset_id(Some("E1"), Some("R1"), Some("R0"));
        assert_eq!(id, "E1");
        assert_eq!(from, ResolvedFrom::Metadata);

        let (id, _) = resolve_live_asset_id(None, Some("R1"), Some("R0"));
        assert_eq!(id, "R1");
    }

    #[test]
    fn test_file_id_carry_over_only() {
        assert_eq!(resolve_file_id(Some("F1")), "F1");
        assert_eq!(resolve_file_id(None), "");
    }
}
