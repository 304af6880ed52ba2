//! Paginated retrieval of a series' episode list.

use super::transport::{ApiRequest, Transport};
use super::tvdb_types::{EpisodeRecord, EpisodesPage};
use super::{Episode, Session, TvdbError};
use std::collections::HashMap;

/// All episodes of one show, grouped by aired season.
///
/// Within a season episodes keep the order the API returned them in.
/// Records are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeCatalog {
    seasons: HashMap<u32, Vec<Episode>>,
}

impl EpisodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an episode to its season
    pub fn push(&mut self, episode: Episode) {
        self.seasons
            .entry(episode.season_number)
            .or_default()
            .push(episode);
    }

    /// Episodes of a season, `None` if the catalog has none for it
    pub fn season(&self, season_number: u32) -> Option<&[Episode]> {
        self.seasons
            .get(&season_number)
            .map(Vec::as_slice)
            .filter(|episodes| !episodes.is_empty())
    }

    /// Number of seasons with at least one episode
    pub fn season_count(&self) -> usize {
        self.seasons.len()
    }

    /// Total number of episode records across all seasons
    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }
}

/// Fetches every episode of a series
///
/// Page 1 is requested first and its `links.last` decides how many pages
/// follow. A missing `last` means there is only the one page. Episodes are
/// tagged with `show_name` as their owning show.
///
/// # Errors
///
/// Any non-success page aborts with [`TvdbError::Fetch`]; episodes from
/// earlier pages are dropped.
pub fn fetch_all_episodes(
    transport: &dyn Transport,
    session: &Session,
    series_id: u64,
    show_name: &str,
) -> Result<EpisodeCatalog, TvdbError> {
    let path = format!("/series/{series_id}/episodes");
    let mut catalog = EpisodeCatalog::new();
    let mut last_page: Option<u32> = None;
    let mut current_page: u32 = 1;

    while last_page.is_none_or(|last| current_page <= last) {
        let request = ApiRequest::get(path.as_str(), session.headers()).query("page", current_page);
        let response = transport.send(&request)?;

        if !response.status.is_success() {
            return Err(TvdbError::Fetch {
                series_id,
                page: current_page,
                status: response.status,
                body: response.body,
            });
        }

        let page: EpisodesPage = response.json()?;

        if last_page.is_none() {
            let last = page
                .links
                .as_ref()
                .and_then(|links| links.last)
                .unwrap_or(current_page);
            tracing::debug!("series {} has {} page(s) of episodes", series_id, last);
            last_page = Some(last);
        }

        for record in page.data.unwrap_or_default() {
            catalog.push(convert_episode(record, show_name, current_page)?);
        }

        current_page += 1;
    }

    Ok(catalog)
}

fn convert_episode(
    record: EpisodeRecord,
    show_name: &str,
    page: u32,
) -> Result<Episode, TvdbError> {
    let (Some(season_number), Some(episode_number)) =
        (record.aired_season, record.aired_episode_number)
    else {
        return Err(TvdbError::InvalidData(format!(
            "episode {} on page {} has no aired season/episode number",
            record.id, page
        )));
    };

    Ok(Episode {
        id: record.id,
        show_name: show_name.to_string(),
        season_number,
        episode_number,
        title: record.episode_name,
    })
}
