//! tv_tagger - Tag a directory of tv episodes using TheTVDB
//!
//! This library matches the episode files of a show directory against the
//! show's episode catalog on TheTVDB and hands every matched file to an
//! external import step that tags it and adds it to the media library.

pub mod config;
pub mod importer;
pub mod reconciler;
pub mod scanner;
pub mod tvdb;

// Re-export error types
pub use config::ConfigError;
pub use importer::ImportError;
pub use reconciler::ReconcileError;
pub use scanner::ScanError;
pub use tvdb::TvdbError;

pub use config::ApiConfig;
pub use importer::{DryRunImporter, LibraryImporter, ScriptImporter};
pub use reconciler::MatchResult;
pub use tvdb::{FixedChooser, HttpTransport, ShowChooser, TerminalChooser, Transport};

use std::path::Path;
use thiserror::Error;

/// Top-level error type for a tagging run
///
/// Every variant is fatal: the run stops at the first one.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error talking to TheTVDB
    #[error("TheTVDB error: {0}")]
    Tvdb(#[from] TvdbError),

    /// Error scanning the show directory
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Error matching or importing a file
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Tags every episode file of a show directory
///
/// The show name is the last component of `show_dir`. The run logs in,
/// resolves the show (asking `chooser` when the name is ambiguous), locates
/// the title card, fetches the complete episode catalog, scans the season
/// directories and finally matches and imports each file in turn.
///
/// # Arguments
///
/// * `show_dir` - The show directory, containing `title.jpg|png` and one
///   directory per season
/// * `config` - API key used to log in
/// * `transport` - Transport the API requests are sent through
/// * `chooser` - Picks the series when the name search is ambiguous
/// * `importer` - Import step run for every matched file
///
/// # Returns
///
/// The matched files with their episodes, in processing order.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use tv_tagger::{ApiConfig, HttpTransport, ScriptImporter, TerminalChooser, tag_show};
///
/// let config = ApiConfig::from_env().unwrap();
/// let transport = HttpTransport::new(&config.base_url);
/// let importer = ScriptImporter::new("osascript", vec!["tag.scpt".into()]);
///
/// let matches = tag_show(
///     Path::new("/tv/Breaking Bad"),
///     &config,
///     &transport,
///     &TerminalChooser,
///     &importer,
/// ).unwrap();
/// println!("tagged {} file(s)", matches.len());
/// ```
pub fn tag_show(
    show_dir: &Path,
    config: &ApiConfig,
    transport: &dyn Transport,
    chooser: &dyn ShowChooser,
    importer: &dyn LibraryImporter,
) -> Result<Vec<MatchResult>, TaggerError> {
    let show_name = scanner::show_name_from_dir(show_dir)?;
    tracing::info!("detected show name \"{}\"", show_name);

    let session = tvdb::Session::authenticate(transport, &config.api_key)?;

    let show = tvdb::resolve_show(transport, &session, &show_name, chooser)?;
    tracing::info!("found show \"{}\", ID {}", show.name, show.id);

    let title_card = scanner::find_title_card(show_dir)?;
    tracing::info!("found title card image {}", title_card.display());

    let catalog = tvdb::fetch_all_episodes(transport, &session, show.id, &show_name)?;
    tracing::info!(
        "fetched {} episode(s) in {} season(s)",
        catalog.episode_count(),
        catalog.season_count()
    );

    let layout = scanner::ShowLayout {
        title_card,
        seasons: scanner::scan_seasons(show_dir)?,
    };

    Ok(reconciler::reconcile(&layout, &catalog, importer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvdb::testing::ScriptedTransport;
    use crate::tvdb::{Episode, ShowCandidate, ShowSelection};
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs::{self, File};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingImporter {
        imported: RefCell<Vec<(PathBuf, String, PathBuf)>>,
    }

    impl LibraryImporter for RecordingImporter {
        fn import(
            &self,
            file: &Path,
            episode: &Episode,
            title_card: &Path,
        ) -> Result<(), ImportError> {
            self.imported.borrow_mut().push((
                file.to_path_buf(),
                episode.to_string(),
                title_card.to_path_buf(),
            ));
            Ok(())
        }
    }

    fn show_dir(temp: &TempDir) -> PathBuf {
        let show = temp.path().join("Breaking Bad");
        for file in [
            "title.jpg",
            "Season 1/Breaking Bad S01E01.mp4",
            "Season 1/Breaking Bad S01E02.m4v",
            "Season 1/cover.txt",
            "Season 2/Breaking Bad S02E01.mp4",
        ] {
            let path = show.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            File::create(path).unwrap();
        }
        show
    }

    fn episodes_page(last: u32, data: serde_json::Value) -> serde_json::Value {
        json!({ "links": { "first": 1, "last": last }, "data": data })
    }

    fn transport() -> ScriptedTransport {
        ScriptedTransport::new()
            .respond(200, json!({ "token": "tok" }))
            .respond(
                200,
                json!({ "data": [
                    { "id": 81189, "seriesName": "Breaking Bad", "network": "AMC",
                      "firstAired": "2008-01-20", "overview": "..." },
                    { "id": 999, "seriesName": "Breaking Bad Insider", "network": null,
                      "firstAired": null, "overview": null }
                ]}),
            )
            .respond(
                200,
                episodes_page(
                    2,
                    json!([
                        { "id": 1, "airedSeason": 1, "airedEpisodeNumber": 1, "episodeName": "Pilot" },
                        { "id": 2, "airedSeason": 1, "airedEpisodeNumber": 2, "episodeName": "Cat's in the Bag..." }
                    ]),
                ),
            )
            .respond(
                200,
                episodes_page(
                    2,
                    json!([
                        { "id": 3, "airedSeason": 2, "airedEpisodeNumber": 1, "episodeName": "Seven Thirty-Seven" }
                    ]),
                ),
            )
    }

    #[test]
    fn test_tag_show_end_to_end() {
        let temp = TempDir::new().unwrap();
        let show = show_dir(&temp);
        let transport = transport();
        let chooser = |_: &str, candidates: &[ShowCandidate]| {
            ShowSelection::Chosen(candidates[0].show.id)
        };
        let importer = RecordingImporter::default();

        let matches = tag_show(
            &show,
            &ApiConfig::new("key"),
            &transport,
            &chooser,
            &importer,
        )
        .unwrap();

        let ids: Vec<u64> = matches.iter().map(|m| m.episode.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let imported = importer.imported.borrow();
        assert_eq!(imported.len(), 3);
        assert_eq!(
            imported[1],
            (
                show.join("Season 1").join("Breaking Bad S01E02.m4v"),
                "Breaking Bad - S01E02 - Cat's in the Bag...".to_string(),
                show.join("title.jpg"),
            )
        );

        assert_eq!(
            transport.paths(),
            vec![
                "/login",
                "/search/series",
                "/series/81189/episodes",
                "/series/81189/episodes",
            ]
        );
    }

    #[test]
    fn test_cancelled_selection_makes_no_further_requests() {
        let temp = TempDir::new().unwrap();
        let show = show_dir(&temp);
        let transport = transport();
        let importer = RecordingImporter::default();

        let err = tag_show(
            &show,
            &ApiConfig::new("key"),
            &transport,
            &FixedChooser::new(None),
            &importer,
        )
        .unwrap_err();

        assert!(matches!(err, TaggerError::Tvdb(TvdbError::UserAborted)));
        assert_eq!(transport.paths(), vec!["/login", "/search/series"]);
        assert!(importer.imported.borrow().is_empty());
    }

    #[test]
    fn test_missing_title_card_stops_before_catalog_fetch() {
        let temp = TempDir::new().unwrap();
        let show = show_dir(&temp);
        fs::remove_file(show.join("title.jpg")).unwrap();
        let transport = transport();

        let err = tag_show(
            &show,
            &ApiConfig::new("key"),
            &transport,
            &FixedChooser::new(Some(81189)),
            &RecordingImporter::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TaggerError::Scan(ScanError::MissingTitleCard(_))
        ));
        assert_eq!(transport.paths().len(), 2);
    }

    #[test]
    fn test_rejected_login() {
        let temp = TempDir::new().unwrap();
        let show = show_dir(&temp);
        let transport = ScriptedTransport::new().respond_text(401, "Not Authorized");

        let err = tag_show(
            &show,
            &ApiConfig::new("bad"),
            &transport,
            &FixedChooser::new(None),
            &RecordingImporter::default(),
        )
        .unwrap_err();

        assert!(matches!(err, TaggerError::Tvdb(TvdbError::Auth { .. })));
        assert!(err.to_string().contains("Not Authorized"));
    }
}
