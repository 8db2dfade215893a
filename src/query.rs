//! Filtering, sorting and limiting of in-memory records.
//!
//! A [`Query`] works on any record implementing [`Queryable`], so the export
//! views and a person's filmography share one code path. Steps run in a
//! fixed order: rating filter, film filter, sort, limit.

use std::{cmp::Ordering, collections::HashSet, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;

use crate::{
    types::{ActivityRecord, FilmCredit, ListEntry},
    utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    WatchedDate,
    Rating,
    Title,
    Year,
    Position,
    Runtime,
    Shuffle,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "date" => Ok(SortKey::Date),
            "watched-date" | "watched" => Ok(SortKey::WatchedDate),
            "rating" => Ok(SortKey::Rating),
            "title" | "name" => Ok(SortKey::Title),
            "year" => Ok(SortKey::Year),
            "position" => Ok(SortKey::Position),
            "runtime" | "duration" => Ok(SortKey::Runtime),
            "shuffle" | "random" => Ok(SortKey::Shuffle),
            other => Err(format!(
                "unknown sort key '{}' (expected date, watched-date, rating, title, year, position, runtime or shuffle)",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Date => "date",
            SortKey::WatchedDate => "watched-date",
            SortKey::Rating => "rating",
            SortKey::Title => "title",
            SortKey::Year => "year",
            SortKey::Position => "position",
            SortKey::Runtime => "runtime",
            SortKey::Shuffle => "shuffle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// Value a record exposes for a sort key. Missing values sort first.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Missing,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
            (SortValue::Missing, _) => Ordering::Less,
            (_, SortValue::Missing) => Ordering::Greater,
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Number(_) => 1,
            SortValue::Date(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

impl<T: Into<f64>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SortValue::Missing, |v| SortValue::Number(v.into()))
    }
}

fn date_value(date: Option<NaiveDate>) -> SortValue {
    date.map_or(SortValue::Missing, SortValue::Date)
}

/// A record the query layer can filter and sort.
pub trait Queryable {
    fn sort_value(&self, key: SortKey) -> SortValue;
    fn title(&self) -> &str;
    fn year(&self) -> Option<i32>;
    fn rating(&self) -> Option<f32>;
}

impl Queryable for ActivityRecord {
    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Date => date_value(self.date),
            SortKey::WatchedDate => date_value(self.watched_date.or(self.date)),
            SortKey::Rating => self.rating.into(),
            SortKey::Title => SortValue::Text(utils::normalize_title(&self.title)),
            SortKey::Year => self.year.into(),
            SortKey::Position => self.position.into(),
            SortKey::Runtime | SortKey::Shuffle => SortValue::Missing,
        }
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn year(&self) -> Option<i32> {
        self.year
    }

    fn rating(&self) -> Option<f32> {
        self.rating
    }
}

impl Queryable for ListEntry {
    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Runtime => self.runtime.into(),
            other => self.record.sort_value(other),
        }
    }

    fn title(&self) -> &str {
        &self.record.title
    }

    fn year(&self) -> Option<i32> {
        self.record.year
    }

    fn rating(&self) -> Option<f32> {
        self.record.rating
    }
}

impl Queryable for FilmCredit {
    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Date | SortKey::WatchedDate => date_value(self.release_date),
            SortKey::Rating => self.rating.into(),
            SortKey::Title => SortValue::Text(utils::normalize_title(&self.title)),
            SortKey::Year => self.year().into(),
            SortKey::Runtime => self.runtime.into(),
            SortKey::Position | SortKey::Shuffle => SortValue::Missing,
        }
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    fn rating(&self) -> Option<f32> {
        self.rating
    }
}

/// Set of films identified by normalized title and optional year.
///
/// Built from a person's filmography to narrow export views to the films
/// associated with that person.
#[derive(Debug, Clone, Default)]
pub struct FilmSet {
    films: HashSet<(String, Option<i32>)>,
    titles: HashSet<String>,
}

impl FilmSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: &str, year: Option<i32>) {
        let title = utils::normalize_title(title);
        self.titles.insert(title.clone());
        self.films.insert((title, year));
    }

    pub fn len(&self) -> usize {
        self.films.len()
    }

    pub fn is_empty(&self) -> bool {
        self.films.is_empty()
    }

    /// Matches on title, and on year too when both sides know it.
    pub fn contains(&self, title: &str, year: Option<i32>) -> bool {
        let title = utils::normalize_title(title);
        match year {
            Some(_) if self.films.contains(&(title.clone(), year)) => true,
            Some(_) => self.films.contains(&(title, None)),
            None => self.titles.contains(&title),
        }
    }
}

impl<'a, T: Queryable + 'a> FromIterator<&'a T> for FilmSet {
    fn from_iter<I: IntoIterator<Item = &'a T>>(iter: I) -> Self {
        let mut set = FilmSet::new();
        for record in iter {
            set.insert(record.title(), record.year());
        }
        set
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: Option<usize>,
    pub ratings: Vec<f32>,
    pub films: Option<FilmSet>,
}

impl Query {
    pub fn new(sort: SortKey, order: SortOrder) -> Self {
        Self {
            sort,
            order,
            limit: None,
            ratings: Vec::new(),
            films: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_ratings(mut self, ratings: Vec<f32>) -> Self {
        self.ratings = ratings;
        self
    }

    pub fn with_films(mut self, films: Option<FilmSet>) -> Self {
        self.films = films;
        self
    }

    /// Returns the filtered, sorted and limited subsequence of `records`.
    ///
    /// Sorting is stable and ascending on the key; descending is the exact
    /// reverse of the ascending result.
    pub fn apply<T: Queryable>(&self, mut records: Vec<T>) -> Vec<T> {
        if !self.ratings.is_empty() {
            records.retain(|r| {
                r.rating()
                    .is_some_and(|rating| self.ratings.iter().any(|f| (f - rating).abs() < 0.01))
            });
        }

        if let Some(films) = &self.films {
            records.retain(|r| films.contains(r.title(), r.year()));
        }

        if self.sort == SortKey::Shuffle {
            records.shuffle(&mut rand::rng());
        } else {
            records.sort_by(|a, b| a.sort_value(self.sort).compare(&b.sort_value(self.sort)));
            if self.order == SortOrder::Descending {
                records.reverse();
            }
        }

        if let Some(limit) = self.limit {
            records.truncate(limit);
        }

        tracing::debug!(
            sort = %self.sort,
            order = ?self.order,
            limit = ?self.limit,
            rows = records.len(),
            "query applied"
        );
        records
    }
}

/// Averages shown under a list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingAverages {
    pub mean: Option<f32>,
    pub time_weighted_mean: Option<f32>,
}

/// Computes the plain mean rating and the runtime-weighted mean.
///
/// Both skip unrated entries; the weighted mean also skips entries without a
/// positive runtime.
pub fn rating_averages(entries: &[(Option<f32>, Option<u32>)]) -> RatingAverages {
    let rated: Vec<f32> = entries.iter().filter_map(|(rating, _)| *rating).collect();
    let mean = if rated.is_empty() {
        None
    } else {
        Some(rated.iter().sum::<f32>() / rated.len() as f32)
    };

    let (weighted_sum, total_runtime) = entries
        .iter()
        .filter_map(|(rating, runtime)| match (rating, runtime) {
            (Some(r), Some(m)) if *m > 0 => Some((*r as f64, *m as f64)),
            _ => None,
        })
        .fold((0.0_f64, 0.0_f64), |(sum, total), (r, m)| {
            (sum + r * m, total + m)
        });

    let time_weighted_mean = if total_runtime > 0.0 {
        Some((weighted_sum / total_runtime) as f32)
    } else {
        None
    };

    RatingAverages {
        mean,
        time_weighted_mean,
    }
}
