//! Matching of scanned episode files to catalog episodes.

use crate::importer::{ImportError, LibraryImporter};
use crate::scanner::{LocalFile, ShowLayout};
use crate::tvdb::{Episode, EpisodeCatalog};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during reconciliation
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The catalog has no episodes for a season directory
    #[error("No episodes were found in TheTVDB for season {season} ({path})")]
    SeasonNotFound { season: u32, path: PathBuf },

    /// A file names an episode the season does not have
    #[error("Episode {episode} of season {season} was not found in TheTVDB ({path})")]
    EpisodeNotFound {
        season: u32,
        episode: u32,
        path: PathBuf,
    },

    /// The import step failed
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// A file and the catalog episode it was matched to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub file: LocalFile,
    pub episode: Episode,
}

/// Matches every episode file of a show to the catalog and imports it
///
/// Seasons and files are processed in scan order, one at a time. Each file is
/// imported right after it was matched; the first error stops the run, so
/// files before it stay imported.
///
/// A file whose marker names a different season than its directory is logged
/// as an error, but its episode number is still looked up in the directory's
/// season.
pub fn reconcile(
    layout: &ShowLayout,
    catalog: &EpisodeCatalog,
    importer: &dyn LibraryImporter,
) -> Result<Vec<MatchResult>, ReconcileError> {
    let mut matches = Vec::new();

    for season in &layout.seasons {
        tracing::info!("found season directory {}", season.path.display());
        tracing::info!("determined season number {}", season.season_number);

        let episodes =
            catalog
                .season(season.season_number)
                .ok_or_else(|| ReconcileError::SeasonNotFound {
                    season: season.season_number,
                    path: season.path.clone(),
                })?;

        for file in &season.files {
            tracing::info!("found episode {}", file.path.display());
            tracing::info!(
                "detected season number {} and episode number {}",
                file.season_number,
                file.episode_number
            );

            if file.season_number != season.season_number {
                tracing::error!(
                    "season number for file {} is {}, does not match directory season {}",
                    file.path.display(),
                    file.season_number,
                    season.season_number
                );
            }

            let episode = find_episode(episodes, file.episode_number).ok_or_else(|| {
                ReconcileError::EpisodeNotFound {
                    season: season.season_number,
                    episode: file.episode_number,
                    path: file.path.clone(),
                }
            })?;
            tracing::info!("found episode in TheTVDB {}", episode);

            importer.import(&file.path, episode, &layout.title_card)?;
            tracing::info!("added to library");

            matches.push(MatchResult {
                file: file.clone(),
                episode: episode.clone(),
            });
        }
    }

    Ok(matches)
}

/// First episode of the season with the given number
fn find_episode(episodes: &[Episode], episode_number: u32) -> Option<&Episode> {
    episodes.iter().find(|e| e.episode_number == episode_number)
}
