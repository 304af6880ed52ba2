/// TheTVDB API response types for deserialization.
///
/// These structures mirror the JSON payloads of the v2 API. Fields the API
/// may send as `null` are optional here and validated by the callers.
use serde::Deserialize;

/// Response of `POST /login`
#[derive(Debug, Deserialize)]
pub(super) struct LoginResponse {
    pub token: Option<String>,
}

/// Response of `GET /search/series`
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<SeriesSearchResult>>,
}

/// A single series from a name search
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SeriesSearchResult {
    pub id: u64,
    pub series_name: Option<String>,
    pub network: Option<String>,
    pub first_aired: Option<String>,
    pub overview: Option<String>,
}

/// One page of `GET /series/{id}/episodes`
#[derive(Debug, Deserialize)]
pub(super) struct EpisodesPage {
    #[serde(default)]
    pub links: Option<PageLinks>,
    #[serde(default)]
    pub data: Option<Vec<EpisodeRecord>>,
}

/// Pagination links of an episodes page
#[derive(Debug, Deserialize)]
pub(super) struct PageLinks {
    pub last: Option<u32>,
}

/// A single episode record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EpisodeRecord {
    pub id: u64,
    pub aired_season: Option<u32>,
    pub aired_episode_number: Option<u32>,
    pub episode_name: Option<String>,
}
