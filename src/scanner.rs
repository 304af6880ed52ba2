//! Scanner for a show directory on disk
//!
//! A show directory is expected to look like this:
//!
//! ```text
//! Breaking Bad/
//!   title.jpg
//!   Season 1/
//!     Breaking Bad S01E01.mp4
//!     Breaking Bad S01E02.m4v
//!   Season 2/
//!     ...
//! ```
//!
//! Every subdirectory is a season directory whose name ends in the season
//! number. Entries are visited in file name order so repeated scans of an
//! unchanged tree yield the same sequence.

use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Extensions of files that are considered episodes
pub const MEDIA_EXTENSIONS: &[&str] = &["m4v", "mp4"];

/// Extensions a title card image may have
pub const TITLE_CARD_EXTENSIONS: &[&str] = &["jpg", "png"];

/// `S01E02` style marker, searched anywhere in the file name
static EPISODE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"S(?P<season>\d{1,2})E(?P<episode>\d{1,2})").expect("episode marker pattern")
});

/// Errors that can occur while scanning a show directory
#[derive(Debug, Error)]
pub enum ScanError {
    /// Path is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to read directory
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed { path: PathBuf, source: io::Error },

    /// The show name could not be derived from the directory path
    #[error("Cannot derive a show name from {0}")]
    MissingShowName(PathBuf),

    /// No `title.*` file in the show directory
    #[error("No title card image was found in {0}")]
    MissingTitleCard(PathBuf),

    /// A `title.*` file exists but is neither jpg nor png
    #[error("Found title card image {0} but it is not a jpg or png")]
    InvalidTitleCard(PathBuf),

    /// Season number could not be parsed from a season directory name
    #[error("Cannot determine season number of directory {path}: {reason}")]
    InvalidSeasonDirectory { path: PathBuf, reason: String },
}

/// An episode file found in a season directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path to the file
    pub path: PathBuf,
    /// Season number from the file name marker
    pub season_number: u32,
    /// Episode number from the file name marker
    pub episode_number: u32,
    /// Extension as found, without the dot
    pub extension: String,
}

/// A season directory and the episode files in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonDirectory {
    pub path: PathBuf,
    /// Season number from the directory name
    pub season_number: u32,
    pub files: Vec<LocalFile>,
}

/// Everything found in a show directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowLayout {
    pub title_card: PathBuf,
    pub seasons: Vec<SeasonDirectory>,
}

/// Derives the show name from the last component of the show directory
///
/// Trailing separators are ignored, so `/tv/Lost/` yields `Lost`.
pub fn show_name_from_dir(show_dir: &Path) -> Result<String, ScanError> {
    show_dir
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ScanError::MissingShowName(show_dir.to_path_buf()))
}

/// Scans a show directory for its title card and season directories
pub fn scan_show(show_dir: &Path) -> Result<ShowLayout, ScanError> {
    let title_card = find_title_card(show_dir)?;
    let seasons = scan_seasons(show_dir)?;
    Ok(ShowLayout {
        title_card,
        seasons,
    })
}

/// Finds the `title.*` image of a show
///
/// If several files match, the first in name order is used.
pub fn find_title_card(show_dir: &Path) -> Result<PathBuf, ScanError> {
    let title_card = list_directory(show_dir)?
        .into_iter()
        .find(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("title."))
        })
        .ok_or_else(|| ScanError::MissingTitleCard(show_dir.to_path_buf()))?;

    if !has_extension(&title_card, TITLE_CARD_EXTENSIONS) {
        return Err(ScanError::InvalidTitleCard(title_card));
    }

    Ok(title_card)
}

/// Collects every season directory of a show with its episode files
pub fn scan_seasons(show_dir: &Path) -> Result<Vec<SeasonDirectory>, ScanError> {
    let mut seasons = Vec::new();

    for path in list_directory(show_dir)? {
        if !path.is_dir() {
            continue;
        }

        let season_number = parse_season_number(&path)?;
        tracing::debug!(
            "season directory {} is season {}",
            path.display(),
            season_number
        );

        let files = list_directory(&path)?
            .into_iter()
            .filter(|p| !p.is_dir())
            .filter_map(|p| parse_episode_file(&p))
            .collect();

        seasons.push(SeasonDirectory {
            path,
            season_number,
            files,
        });
    }

    Ok(seasons)
}

/// Parses the season number from the last whitespace separated token of a
/// directory name, e.g. `Season 3` is season 3
pub fn parse_season_number(season_dir: &Path) -> Result<u32, ScanError> {
    let invalid = |reason: String| ScanError::InvalidSeasonDirectory {
        path: season_dir.to_path_buf(),
        reason,
    };

    let name = season_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid("directory name is not valid UTF-8".to_string()))?;

    let token = name
        .split_whitespace()
        .last()
        .ok_or_else(|| invalid("directory name is empty".to_string()))?;

    match token.parse::<u32>() {
        Ok(0) => Err(invalid("season number must be positive".to_string())),
        Ok(season) => Ok(season),
        Err(e) => Err(invalid(format!("'{token}' is not a number: {e}"))),
    }
}

/// Turns a file into an episode candidate
///
/// Returns `None` for files without an `SxxEyy` marker or without a media
/// extension. Those are skipped, not reported.
pub fn parse_episode_file(path: &Path) -> Option<LocalFile> {
    let file_name = path.file_name()?.to_str()?;
    let captures = EPISODE_MARKER_RE.captures(file_name)?;

    if !has_extension(path, MEDIA_EXTENSIONS) {
        return None;
    }

    Some(LocalFile {
        path: path.to_path_buf(),
        season_number: captures["season"].parse().ok()?,
        episode_number: captures["episode"].parse().ok()?,
        extension: path.extension()?.to_str()?.to_string(),
    })
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| allowed.contains(&e))
}

/// Lists the entries of a directory in file name order
fn list_directory(dir_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir_path.is_dir() {
        return Err(ScanError::NotADirectory(dir_path.to_path_buf()));
    }

    let read_failed = |source: io::Error| ScanError::ReadDirectoryFailed {
        path: dir_path.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir_path)
        .map_err(read_failed)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_failed)?;

    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn test_episode_file_in_season_directory() {
        let temp = TempDir::new().unwrap();
        let show = temp.path().join("Show");
        touch(&show.join("title.jpg"));
        touch(&show.join("Season 1").join("S01E02.mp4"));
        touch(&show.join("Season 1").join("S01E03.txt"));

        let layout = scan_show(&show).unwrap();

        assert_eq!(layout.title_card, show.join("title.jpg"));
        assert_eq!(layout.seasons.len(), 1);
        let season = &layout.seasons[0];
        assert_eq!(season.season_number, 1);
        assert_eq!(
            season.files,
            vec![LocalFile {
                path: show.join("Season 1").join("S01E02.mp4"),
                season_number: 1,
                episode_number: 2,
                extension: "mp4".to_string(),
            }]
        );
    }

    #[test]
    fn test_files_without_marker_are_skipped() {
        let temp = TempDir::new().unwrap();
        let season = temp.path().join("Season 2");
        touch(&season.join("Show S02E01.m4v"));
        touch(&season.join("extras.mp4"));
        touch(&season.join("Show s02e02.mp4"));
        fs::create_dir_all(season.join("S02E03.mp4")).unwrap();

        let seasons = scan_seasons(temp.path()).unwrap();

        assert_eq!(seasons.len(), 1);
        let episodes: Vec<u32> = seasons[0].files.iter().map(|f| f.episode_number).collect();
        assert_eq!(episodes, vec![1]);
    }

    #[test]
    fn test_seasons_in_name_order() {
        let temp = TempDir::new().unwrap();
        for name in ["Season 3", "Season 1", "Season 2"] {
            fs::create_dir_all(temp.path().join(name)).unwrap();
        }
        touch(&temp.path().join("notes.txt"));

        let numbers: Vec<u32> = scan_seasons(temp.path())
            .unwrap()
            .iter()
            .map(|s| s.season_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_season_number() {
        assert_eq!(parse_season_number(Path::new("/tv/Show/Season 1")).unwrap(), 1);
        assert_eq!(parse_season_number(Path::new("Staffel  12")).unwrap(), 12);
        assert_eq!(parse_season_number(Path::new("7")).unwrap(), 7);
        assert!(matches!(
            parse_season_number(Path::new("Specials")),
            Err(ScanError::InvalidSeasonDirectory { .. })
        ));
        assert!(matches!(
            parse_season_number(Path::new("Season 0")),
            Err(ScanError::InvalidSeasonDirectory { .. })
        ));
    }

    #[test]
    fn test_unparseable_season_directory_fails_scan() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Extras")).unwrap();

        let err = scan_seasons(temp.path()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidSeasonDirectory { .. }));
    }

    #[test]
    fn test_parse_episode_file() {
        let file = parse_episode_file(Path::new("/x/Lost S04E13 There's No Place.m4v")).unwrap();
        assert_eq!(file.season_number, 4);
        assert_eq!(file.episode_number, 13);
        assert_eq!(file.extension, "m4v");

        assert!(parse_episode_file(Path::new("S01E02.mkv")).is_none());
        assert!(parse_episode_file(Path::new("S01E02.MP4")).is_none());
        assert!(parse_episode_file(Path::new("Episode 2.mp4")).is_none());
    }

    #[test]
    fn test_missing_title_card() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("poster.jpg"));

        let err = find_title_card(temp.path()).unwrap_err();
        assert!(matches!(err, ScanError::MissingTitleCard(_)));
    }

    #[test]
    fn test_invalid_title_card() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("title.gif"));

        let err = find_title_card(temp.path()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidTitleCard(p) if p.ends_with("title.gif")));
    }

    #[test]
    fn test_png_title_card() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("title.png"));

        assert_eq!(
            find_title_card(temp.path()).unwrap(),
            temp.path().join("title.png")
        );
    }

    #[test]
    fn test_show_name_from_dir() {
        assert_eq!(show_name_from_dir(Path::new("/tv/Lost/")).unwrap(), "Lost");
        assert_eq!(
            show_name_from_dir(Path::new("Breaking Bad")).unwrap(),
            "Breaking Bad"
        );
        assert!(show_name_from_dir(Path::new("/")).is_err());
    }

    #[test]
    fn test_scan_file_instead_of_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        touch(&file);

        assert!(matches!(
            scan_seasons(&file),
            Err(ScanError::NotADirectory(_))
        ));
    }
}
