//! Resolving a show name to a single TheTVDB series.
//!
//! A name search may return several series. In that case every candidate is
//! rendered as a short summary and a [`ShowChooser`] decides which one is
//! meant, or cancels the run.

use super::transport::{ApiRequest, Transport};
use super::tvdb_types::{SearchResponse, SeriesSearchResult};
use super::{Session, ShowRecord, TvdbError};
use dialoguer::Input;
use reqwest::StatusCode;

/// Column width summaries are wrapped at
const SUMMARY_WIDTH: usize = 150;

/// A search hit offered to a [`ShowChooser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCandidate {
    pub show: ShowRecord,
    /// Human readable, word-wrapped summary of the show
    pub summary: String,
}

/// Outcome of a disambiguation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowSelection {
    /// The series with this id was chosen
    Chosen(u64),
    /// The user declined to pick one
    Cancelled,
}

/// Picks one series out of several search results.
///
/// Implemented by [`TerminalChooser`] for interactive use, by
/// [`FixedChooser`] for automation, and by any
/// `Fn(&str, &[ShowCandidate]) -> ShowSelection` closure.
pub trait ShowChooser {
    fn choose(
        &self,
        show_name: &str,
        candidates: &[ShowCandidate],
    ) -> Result<ShowSelection, TvdbError>;
}

impl<F> ShowChooser for F
where
    F: Fn(&str, &[ShowCandidate]) -> ShowSelection,
{
    fn choose(
        &self,
        show_name: &str,
        candidates: &[ShowCandidate],
    ) -> Result<ShowSelection, TvdbError> {
        Ok(self(show_name, candidates))
    }
}

/// Prints the candidates and asks on the terminal which one is meant.
///
/// Entering `q` cancels. Anything that is neither `q` nor one of the listed
/// ids is rejected and asked again.
#[derive(Debug, Default)]
pub struct TerminalChooser;

impl ShowChooser for TerminalChooser {
    fn choose(
        &self,
        _show_name: &str,
        candidates: &[ShowCandidate],
    ) -> Result<ShowSelection, TvdbError> {
        for candidate in candidates {
            println!("{}\n", candidate.summary);
        }

        let ids: Vec<u64> = candidates.iter().map(|c| c.show.id).collect();
        let answer: String = Input::new()
            .with_prompt(r#"Enter the ID of the correct match, or "q" to exit"#)
            .validate_with(|input: &String| -> Result<(), String> {
                parse_answer(input, &ids)
                    .map(|_| ())
                    .ok_or_else(|| format!("'{}' is not one of the listed ids", input.trim()))
            })
            .interact_text()
            .map_err(|e| TvdbError::Prompt(e.to_string()))?;

        parse_answer(&answer, &ids)
            .ok_or_else(|| TvdbError::Prompt(format!("unexpected answer '{answer}'")))
    }
}

/// Interprets a prompt answer against the offered ids
fn parse_answer(input: &str, ids: &[u64]) -> Option<ShowSelection> {
    let input = input.trim();
    if input == "q" {
        return Some(ShowSelection::Cancelled);
    }
    input
        .parse::<u64>()
        .ok()
        .filter(|id| ids.contains(id))
        .map(ShowSelection::Chosen)
}

/// Always picks the same series id; cancels when none was configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedChooser {
    series_id: Option<u64>,
}

impl FixedChooser {
    pub fn new(series_id: Option<u64>) -> Self {
        Self { series_id }
    }
}

impl ShowChooser for FixedChooser {
    fn choose(
        &self,
        _show_name: &str,
        _candidates: &[ShowCandidate],
    ) -> Result<ShowSelection, TvdbError> {
        Ok(self
            .series_id
            .map_or(ShowSelection::Cancelled, ShowSelection::Chosen))
    }
}

/// Looks up a show by name
///
/// A single search hit is returned without consulting the chooser. Several
/// hits are handed to `chooser` as rendered candidates.
///
/// # Errors
///
/// * [`TvdbError::ShowNotFound`] on zero hits or an HTTP 404
/// * [`TvdbError::Remote`] on any other non-success status
/// * [`TvdbError::UserAborted`] if the chooser cancels
/// * [`TvdbError::InvalidSelection`] if the chooser returns an id it was not offered
pub fn resolve_show(
    transport: &dyn Transport,
    session: &Session,
    show_name: &str,
    chooser: &dyn ShowChooser,
) -> Result<ShowRecord, TvdbError> {
    let request = ApiRequest::get("/search/series", session.headers()).query("name", show_name);
    let response = transport.send(&request)?;

    if response.status == StatusCode::NOT_FOUND {
        return Err(TvdbError::ShowNotFound(show_name.to_string()));
    }
    if !response.status.is_success() {
        return Err(TvdbError::Remote {
            status: response.status,
            body: response.body,
        });
    }

    let mut shows: Vec<ShowRecord> = response
        .json::<SearchResponse>()?
        .data
        .unwrap_or_default()
        .into_iter()
        .map(convert_show)
        .collect();

    match shows.len() {
        0 => Err(TvdbError::ShowNotFound(show_name.to_string())),
        1 => Ok(shows.remove(0)),
        count => {
            tracing::warn!("{} shows matching name {} were found", count, show_name);

            let candidates: Vec<ShowCandidate> = shows
                .into_iter()
                .map(|show| ShowCandidate {
                    summary: render_summary(&show, SUMMARY_WIDTH),
                    show,
                })
                .collect();

            match chooser.choose(show_name, &candidates)? {
                ShowSelection::Cancelled => Err(TvdbError::UserAborted),
                ShowSelection::Chosen(id) => candidates
                    .into_iter()
                    .find(|c| c.show.id == id)
                    .map(|c| c.show)
                    .ok_or(TvdbError::InvalidSelection(id)),
            }
        }
    }
}

fn convert_show(result: SeriesSearchResult) -> ShowRecord {
    ShowRecord {
        id: result.id,
        name: result.series_name.unwrap_or_default(),
        network: result.network,
        first_aired: result.first_aired,
        overview: result.overview,
    }
}

/// Renders a one-paragraph summary of a show
///
/// The lead `"<id>: <name> (<network>, <first aired>):"` is followed by the
/// overview. Lines are wrapped at `width` columns, continuation lines are
/// indented past the lead.
pub fn render_summary(show: &ShowRecord, width: usize) -> String {
    let lead = format!(
        "{}: {} ({}, {}):",
        show.id,
        show.name,
        show.network.as_deref().unwrap_or("unknown"),
        show.first_aired.as_deref().unwrap_or("unknown"),
    );
    let text = format!("{} {}", lead, show.overview.as_deref().unwrap_or(""));
    let indent = " ".repeat(lead.chars().count() + 1);

    wrap_words(&text, width, &indent)
}

/// Greedy word wrap; a word longer than the line is kept whole
fn wrap_words(text: &str, width: usize, indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            if !lines.is_empty() {
                line.push_str(indent);
            }
            line.push_str(word);
            continue;
        }

        if line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
            line.push_str(indent);
            line.push_str(word);
        } else {
            line.push(' ');
            line.push_str(word);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
