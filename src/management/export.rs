use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use futures_lite::stream::StreamExt;

use crate::{
    Error, Res,
    query::{FilmSet, SortKey},
    types::{ActivityRecord, LetterboxdList},
    utils,
};

use super::lists::parse_list;

/// The files of an extracted Letterboxd export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Diary,
    Watchlist,
    Ratings,
    Watched,
    Lists,
}

impl ExportKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportKind::Diary => "diary.csv",
            ExportKind::Watchlist => "watchlist.csv",
            ExportKind::Ratings => "ratings.csv",
            ExportKind::Watched => "watched.csv",
            ExportKind::Lists => "lists",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExportKind::Diary => "Diary",
            ExportKind::Watchlist => "Watchlist",
            ExportKind::Ratings => "Ratings",
            ExportKind::Watched => "Watched",
            ExportKind::Lists => "Lists",
        }
    }

    pub fn default_sort(&self) -> SortKey {
        match self {
            ExportKind::Diary => SortKey::WatchedDate,
            ExportKind::Watchlist | ExportKind::Watched => SortKey::Date,
            ExportKind::Ratings => SortKey::Rating,
            ExportKind::Lists => SortKey::Position,
        }
    }
}

/// Files that must exist for the export to count as downloaded.
const REQUIRED_EXPORTS: [ExportKind; 4] = [
    ExportKind::Diary,
    ExportKind::Watchlist,
    ExportKind::Ratings,
    ExportKind::Watched,
];

/// Reads the extracted export below `<root>/static`.
///
/// # Example
///
/// ```
/// let exports = ExportManager::new(config.exports_folder());
/// let diary = exports.load(ExportKind::Diary).await?;
/// ```
pub struct ExportManager {
    folder: PathBuf,
}

impl ExportManager {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Path of an export file, failing with [`Error::ExportNotFound`] if it is missing.
    pub fn path(&self, kind: ExportKind) -> Res<PathBuf> {
        let path = self.folder.join(kind.file_name());
        if !path.exists() {
            return Err(Error::ExportNotFound(path));
        }
        Ok(path)
    }

    /// True when every core export file has been extracted.
    pub fn exists(&self) -> bool {
        REQUIRED_EXPORTS.iter().all(|kind| {
            let present = self.folder.join(kind.file_name()).is_file();
            if !present {
                tracing::debug!(file = kind.file_name(), "export file missing");
            }
            present
        })
    }

    /// Loads every row of one export file.
    ///
    /// # Arguments
    ///
    /// * `kind` - Diary, watchlist, ratings or watched; lists go through
    ///   [`ExportManager::load_lists`]
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<ActivityRecord>)` - The rows in file order
    /// - `Err(Error::ExportNotFound)` - The file has not been downloaded yet
    /// - `Err(Error::Csv)` - A row cannot be parsed
    pub async fn load(&self, kind: ExportKind) -> Res<Vec<ActivityRecord>> {
        if kind == ExportKind::Lists {
            return Err(Error::Other(
                "lists are loaded with ExportManager::load_lists".to_string(),
            ));
        }

        let path = self.path(kind)?;
        let content = async_fs::read_to_string(&path).await?;
        let records = read_records(&content)?;
        tracing::info!(
            path = %path.display(),
            rows = records.len(),
            "loaded {}",
            kind.title()
        );
        Ok(records)
    }

    /// Like [`ExportManager::load`] but a missing file yields `None`.
    pub async fn load_optional(&self, kind: ExportKind) -> Res<Option<Vec<ActivityRecord>>> {
        match self.load(kind).await {
            Ok(records) => Ok(Some(records)),
            Err(Error::ExportNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Loads every list of the export, sorted by list name.
    ///
    /// Each `lists/*.csv` file is parsed with [`parse_list`].
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<LetterboxdList>)` - The lists, ordered case-insensitively by name
    /// - `Err(Error::ExportNotFound)` - The export has no `lists` folder
    /// - `Err(Error::InvalidExport)` - A list file lacks its header rows
    pub async fn load_lists(&self) -> Res<Vec<LetterboxdList>> {
        let dir = self.path(ExportKind::Lists)?;
        let mut lists = Vec::new();

        let mut entries = Vec::new();
        let mut dir_entries = async_fs::read_dir(&dir).await?;
        while let Some(entry) = dir_entries.try_next().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                entries.push(path);
            }
        }
        entries.sort();

        for path in entries {
            let content = async_fs::read_to_string(&path).await?;
            lists.push(parse_list(&content, &path)?);
        }

        lists.sort_by(|a, b| a.meta.name.to_lowercase().cmp(&b.meta.name.to_lowercase()));
        tracing::info!(dir = %dir.display(), lists = lists.len(), "loaded lists");
        Ok(lists)
    }
}

/// Deserializes export rows from CSV text with a header line.
pub fn read_records(content: &str) -> Res<Vec<ActivityRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize::<ActivityRecord>() {
        records.push(row?);
    }
    Ok(records)
}

type FilmKey = (String, Option<i32>);

fn film_key(title: &str, year: Option<i32>) -> FilmKey {
    (utils::normalize_title(title), year)
}

/// Lookup tables over the user's watched films, ratings and watchlist.
///
/// Used to enrich search results and lists with the user's own activity.
#[derive(Debug, Default)]
pub struct ActivityIndex {
    watched: FilmSet,
    watchlist: FilmSet,
    ratings_by_url: HashMap<String, f32>,
    ratings_by_film: HashMap<FilmKey, f32>,
}

impl ActivityIndex {
    /// Loads the index, or `None` when the export has not been downloaded.
    pub async fn load(exports: &ExportManager) -> Res<Option<Self>> {
        if !exports.exists() {
            return Ok(None);
        }

        let watched = exports.load(ExportKind::Watched).await?;
        let watchlist = exports.load(ExportKind::Watchlist).await?;
        let ratings = exports.load(ExportKind::Ratings).await?;
        Ok(Some(Self::from_records(&watched, &watchlist, &ratings)))
    }

    pub fn from_records(
        watched: &[ActivityRecord],
        watchlist: &[ActivityRecord],
        ratings: &[ActivityRecord],
    ) -> Self {
        let mut index = Self {
            watched: watched.iter().collect(),
            watchlist: watchlist.iter().collect(),
            ..Self::default()
        };

        for record in ratings {
            if let Some(rating) = record.rating {
                if !record.url.is_empty() {
                    index.ratings_by_url.insert(record.url.clone(), rating);
                }
                index
                    .ratings_by_film
                    .insert(film_key(&record.title, record.year), rating);
            }
        }
        index
    }

    pub fn is_watched(&self, title: &str, year: Option<i32>) -> bool {
        self.watched.contains(title, year)
    }

    pub fn in_watchlist(&self, title: &str, year: Option<i32>) -> bool {
        self.watchlist.contains(title, year)
    }

    pub fn rating(&self, title: &str, year: Option<i32>) -> Option<f32> {
        self.ratings_by_film.get(&film_key(title, year)).copied()
    }

    /// Rating for an export row, joined on its Letterboxd URL first and on
    /// title and year otherwise.
    pub fn rating_for(&self, record: &ActivityRecord) -> Option<f32> {
        self.ratings_by_url
            .get(&record.url)
            .copied()
            .or_else(|| self.rating(&record.title, record.year))
    }
}
