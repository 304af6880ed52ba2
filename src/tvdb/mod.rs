/// Client side of TheTVDB v2 API.
///
/// This module covers everything the tagger needs from the remote catalog:
/// logging in, resolving a show name to a series, and pulling the full
/// episode list of that series. All requests go through the [`Transport`]
/// seam so the network can be swapped out.
mod catalog;
mod resolver;
mod session;
mod transport;
mod tvdb_types;

pub use catalog::{EpisodeCatalog, fetch_all_episodes};
pub use resolver::{
    FixedChooser, ShowCandidate, ShowChooser, ShowSelection, TerminalChooser, render_summary,
    resolve_show,
};
pub use session::Session;
pub use transport::{ApiRequest, ApiResponse, DEFAULT_BASE_URL, HttpTransport, Transport};

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to TheTVDB.
#[derive(Debug, Error)]
pub enum TvdbError {
    /// Login was rejected
    #[error("Error logging in: HTTP {status}: {body}")]
    Auth { status: StatusCode, body: String },

    /// The search returned no series for the name
    #[error("Show not found: {0}")]
    ShowNotFound(String),

    /// Any other non-success API response
    #[error("Unexpected API error: HTTP {status}: {body}")]
    Remote { status: StatusCode, body: String },

    /// Disambiguation was cancelled
    #[error("Show selection aborted by user")]
    UserAborted,

    /// The chooser picked an id that was not offered
    #[error("Selected series id {0} is not one of the candidates")]
    InvalidSelection(u64),

    /// The interactive prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// A page of the episode listing could not be fetched
    #[error("Error getting episodes for series {series_id} page {page}: HTTP {status}: {body}")]
    Fetch {
        series_id: u64,
        page: u32,
        status: StatusCode,
        body: String,
    },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Request(String),

    /// Failed to parse the JSON response
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The API returned data we cannot work with
    #[error("API returned invalid data: {0}")]
    InvalidData(String),
}

/// A series as returned by the name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRecord {
    /// TheTVDB series id
    pub id: u64,
    /// Display name of the series
    pub name: String,
    pub network: Option<String>,
    pub first_aired: Option<String>,
    pub overview: Option<String>,
}

/// A single episode of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// TheTVDB episode id
    pub id: u64,
    /// Name of the show the episode belongs to, as taken from the show directory
    pub show_name: String,
    /// Aired season number
    pub season_number: u32,
    /// Aired episode number within the season
    pub episode_number: u32,
    /// Episode title (absent for some unaired or stub entries)
    pub title: Option<String>,
}

impl fmt::Display for Episode {
    /// Renders the title handed to the import step, e.g.
    /// `Breaking Bad - S01E02 - Cat's in the Bag...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - S{:02}E{:02} - {}",
            self.show_name,
            self.season_number,
            self.episode_number,
            self.title.as_deref().unwrap_or("Unknown")
        )
    }
}
