//! Bookmark service - request assembly against the OTT gateway
//!
//! Turns a resolved [`ReportParams`] set plus the config's identity fields
//! into a transport-ready `reqwest::Request`. No network I/O happens here;
//! the caller dispatches the request asynchronously.

use crate::config::ReportingConfig;
use crate::error::{Error, Result};
use crate::types::ReportParams;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Wire body for `bookmark/action/add`
#[derive(Debug, Serialize)]
struct BookmarkBody<'a> {
    ks: &'a str,
    bookmark: Bookmark<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Bookmark<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    asset_type: &'a str,
    position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    epg_id: Option<&'a str>,
    player_data: PlayerData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerData<'a> {
    action: &'a str,
    file_id: &'a str,
}

/// Builds bookmark requests for the OTT gateway
#[derive(Debug, Clone, Default)]
pub struct BookmarkService {
    client: reqwest::Client,
}

impl BookmarkService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a `bookmark/action/add` request
    ///
    /// Refuses with [`Error::RequestBuildFailed`] when the configured
    /// endpoint is malformed or the body cannot be serialized.
    pub fn action_add(
        &self,
        config: &ReportingConfig,
        params: &ReportParams,
    ) -> Result<reqwest::Request> {
        let mut url = Url::parse(&config.base_url).map_err(|e| Error::RequestBuildFailed {
            reason: format!("invalid endpoint {:?}: {e}", config.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|_| Error::RequestBuildFailed {
                reason: format!("endpoint {:?} cannot carry a service path", config.base_url),
            })?
            .pop_if_empty()
            .extend(["service", "bookmark", "action", "add"]);
        url.query_pairs_mut()
            .append_pair("partnerId", &config.partner_id.to_string());

        let body = BookmarkBody {
            ks: &config.ks,
            bookmark: Bookmark {
                id: &params.asset_id,
                asset_type: &params.asset_type,
                position: params.current_time,
                epg_id: params.epg_id.as_deref(),
                player_data: PlayerData {
                    action: &params.event_tag,
                    file_id: &params.file_id,
                },
            },
        };

        let request = self
            .client
            .post(url.clone())
            .json(&body)
            .build()
            .map_err(|e| Error::RequestBuildFailed { reason: e.to_string() })?;

        debug!(url = %url, action = %params.event_tag, "Bookmark request assembled");

        Ok(request)
    }
}
